//! Detail view for one selected ticker: a one-year series with full EMA50
//! and RSI14 histories for charting.

use chrono::NaiveDate;

use crate::domain::error::SamscreenError;
use crate::domain::indicator::{
    EMA_PERIOD, IndicatorSeries, RSI_PERIOD, calculate_ema, calculate_rsi,
};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::result_set::round2;
use crate::domain::screener::lookback_window;
use crate::ports::data_port::DataPort;

pub const DETAIL_LOOKBACK_DAYS: i64 = 365;

#[derive(Debug, Clone)]
pub struct DetailSeries {
    pub ticker: String,
    pub bars: Vec<OhlcvBar>,
    pub ema: IndicatorSeries,
    pub rsi: IndicatorSeries,
}

impl DetailSeries {
    /// Annotate a bar series with its full EMA50 and RSI14 histories.
    pub fn from_bars(ticker: &str, bars: Vec<OhlcvBar>) -> Self {
        let ema = calculate_ema(&bars, EMA_PERIOD);
        let rsi = calculate_rsi(&bars, RSI_PERIOD);
        Self {
            ticker: ticker.to_string(),
            bars,
            ema,
            rsi,
        }
    }

    pub fn latest_price(&self) -> Option<f64> {
        self.bars.last().map(|b| b.close)
    }

    pub fn latest_rsi(&self) -> Option<f64> {
        self.rsi.latest().map(round2)
    }

    pub fn latest_volume(&self) -> Option<i64> {
        self.bars.last().map(|b| b.volume)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }
}

/// Millions with two decimals from 1,000,000 upwards, plain count below.
pub fn format_volume(volume: i64) -> String {
    if volume >= 1_000_000 {
        format!("{:.2}M", volume as f64 / 1_000_000.0)
    } else {
        volume.to_string()
    }
}

/// Fetch and annotate the detail series. Unlike a scan, a failure here is
/// returned to the caller because the user asked for this ticker specifically.
pub fn load_detail(
    data: &dyn DataPort,
    ticker: &str,
    as_of: NaiveDate,
    lookback_days: i64,
) -> Result<DetailSeries, SamscreenError> {
    let (start_date, end_date) = lookback_window(as_of, lookback_days).map_err(|_| {
        SamscreenError::invalid(
            "detail",
            "lookback_days",
            format!("lookback of {} days is out of range", lookback_days),
        )
    })?;
    let bars = data.fetch_ohlcv(ticker, start_date, end_date)?;
    if bars.is_empty() {
        return Err(SamscreenError::NoData {
            code: ticker.to_string(),
        });
    }
    tracing::debug!(ticker, bars = bars.len(), "loaded detail series");
    Ok(DetailSeries::from_bars(ticker, bars))
}
