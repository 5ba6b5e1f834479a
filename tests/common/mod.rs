#![allow(dead_code)]

use chrono::NaiveDate;
use samscreen::domain::error::SamscreenError;
pub use samscreen::domain::ohlcv::OhlcvBar;
use samscreen::ports::data_port::DataPort;
use samscreen::ports::universe_port::UniversePort;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory market data. Date bounds are ignored so fixtures do not have
/// to track the wall clock.
pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
    pub calls: Mutex<Vec<String>>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_bars(mut self, code: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(code.to_string(), bars);
        self
    }

    pub fn with_error(mut self, code: &str, reason: &str) -> Self {
        self.errors.insert(code.to_string(), reason.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl DataPort for MockDataPort {
    fn fetch_ohlcv(
        &self,
        code: &str,
        _start_date: NaiveDate,
        _end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, SamscreenError> {
        self.calls.lock().unwrap().push(code.to_string());
        if let Some(reason) = self.errors.get(code) {
            return Err(SamscreenError::DataFetch {
                code: code.to_string(),
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(code).cloned().unwrap_or_default())
    }
}

pub struct MockUniversePort {
    pub result: Result<Vec<String>, String>,
}

impl MockUniversePort {
    pub fn new(tickers: &[&str]) -> Self {
        Self {
            result: Ok(tickers.iter().map(|t| t.to_string()).collect()),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            result: Err(reason.to_string()),
        }
    }
}

impl UniversePort for MockUniversePort {
    fn fetch_tickers(&self) -> Result<Vec<String>, SamscreenError> {
        self.result
            .clone()
            .map_err(|reason| SamscreenError::UniverseUnavailable { reason })
    }
}

pub fn make_bar(code: &str, date: &str, close: f64) -> OhlcvBar {
    OhlcvBar {
        code: code.to_string(),
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        volume: 1000,
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Daily bars with closes rising by one per bar. RSI pins at 100, so these
/// fail the oversold filter.
pub fn generate_bars(
    code: &str,
    start_date: &str,
    count: usize,
    start_price: f64,
) -> Vec<OhlcvBar> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    (0..count)
        .map(|i| OhlcvBar {
            code: code.to_string(),
            date: start + chrono::Duration::days(i as i64),
            open: start_price + i as f64,
            high: start_price + i as f64 + 1.0,
            low: start_price + i as f64 - 1.0,
            close: start_price + i as f64,
            volume: 1000,
        })
        .collect()
}

pub fn bars_from(code: &str, start: NaiveDate, closes: &[f64], volumes: &[i64]) -> Vec<OhlcvBar> {
    closes
        .iter()
        .zip(volumes)
        .enumerate()
        .map(|(i, (&close, &volume))| OhlcvBar {
            code: code.to_string(),
            date: start + chrono::Duration::days(i as i64),
            open: close,
            high: close + 0.5,
            low: close - 0.5,
            close,
            volume,
        })
        .collect()
}

/// 60 flat bars at 100 followed by 14 declines of `step`, with volume
/// doubling over the last three bars.
///
/// Every change in the final RSI window is a loss, so RSI is 0. The EMA lags
/// the decline by roughly ten steps, which keeps the close within 2% of it
/// for steps up to about 0.15.
pub fn oversold_bars(code: &str, start: NaiveDate, step: f64) -> Vec<OhlcvBar> {
    let mut closes = vec![100.0; 60];
    for i in 1..=14 {
        closes.push(100.0 - step * i as f64);
    }
    let mut volumes = vec![1000; closes.len()];
    let n = volumes.len();
    for v in &mut volumes[n - 3..] {
        *v = 2000;
    }
    bars_from(code, start, &closes, &volumes)
}

pub fn oversold_fixture(code: &str, step: f64) -> Vec<OhlcvBar> {
    oversold_bars(code, date(2024, 1, 1), step)
}
