//! Daily OHLCV over the public Yahoo Finance chart endpoint.

use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveTime};
use serde::Deserialize;

use crate::domain::error::SamscreenError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

const USER_AGENT: &str = concat!("samscreen/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

/// Yahoo spells class shares with a dash (`BRK.B` is `BRK-B`).
pub fn yahoo_symbol(code: &str) -> String {
    code.replace('.', "-")
}

fn at(values: &[Option<f64>], i: usize) -> Option<f64> {
    values.get(i).copied().flatten()
}

/// Parse a chart response body into ascending daily bars.
///
/// Rows with any null field (halts, partial sessions) are dropped. The
/// bars carry `code` as given, not the Yahoo spelling.
pub fn parse_chart_response(code: &str, body: &str) -> Result<Vec<OhlcvBar>, SamscreenError> {
    let fetch_err = |reason: String| SamscreenError::DataFetch {
        code: code.to_string(),
        reason,
    };

    let envelope: ChartEnvelope =
        serde_json::from_str(body).map_err(|e| fetch_err(format!("malformed chart response: {}", e)))?;

    if let Some(err) = envelope.chart.error {
        return Err(fetch_err(format!("{}: {}", err.code, err.description)));
    }

    let Some(result) = envelope.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Vec::new());
    };
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let offset = result.meta.gmtoffset;

    let mut bars = Vec::with_capacity(result.timestamp.len());
    for (i, &ts) in result.timestamp.iter().enumerate() {
        let Some(date) = DateTime::from_timestamp(ts + offset, 0).map(|dt| dt.date_naive()) else {
            continue;
        };
        let (Some(open), Some(high), Some(low), Some(close), Some(volume)) = (
            at(&quote.open, i),
            at(&quote.high, i),
            at(&quote.low, i),
            at(&quote.close, i),
            at(&quote.volume, i),
        ) else {
            continue;
        };
        let bar = OhlcvBar {
            code: code.to_string(),
            date,
            open,
            high,
            low,
            close,
            volume: volume.round() as i64,
        };
        if bar.is_well_formed() {
            bars.push(bar);
        }
    }

    bars.sort_by_key(|b| b.date);
    bars.dedup_by_key(|b| b.date);
    Ok(bars)
}

pub struct YahooAdapter {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl YahooAdapter {
    pub fn new(timeout_secs: u64) -> Result<Self, SamscreenError> {
        Self::with_base_url(DEFAULT_BASE_URL, timeout_secs)
    }

    pub fn with_base_url(base_url: &str, timeout_secs: u64) -> Result<Self, SamscreenError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| SamscreenError::Io(std::io::Error::other(e)))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn chart_url(&self, code: &str) -> String {
        format!("{}/v8/finance/chart/{}", self.base_url, yahoo_symbol(code))
    }
}

fn unix_midnight(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

impl DataPort for YahooAdapter {
    fn fetch_ohlcv(
        &self,
        code: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, SamscreenError> {
        let fetch_err = |reason: String| SamscreenError::DataFetch {
            code: code.to_string(),
            reason,
        };

        // period2 is exclusive.
        let period1 = unix_midnight(start_date);
        let period2 = unix_midnight(end_date) + 86_400;

        let response = self
            .client
            .get(self.chart_url(code))
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
            ])
            .send()
            .map_err(|e| fetch_err(format!("request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| fetch_err(format!("failed to read response: {}", e)))?;

        match parse_chart_response(code, &body) {
            Ok(bars) => {
                tracing::trace!(ticker = code, bars = bars.len(), "fetched chart");
                Ok(bars)
            }
            Err(e) if status.is_success() => Err(e),
            Err(_) => Err(fetch_err(format!("HTTP {}", status))),
        }
    }
}
