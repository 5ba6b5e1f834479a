//! Technical indicators computed over a bar series.
//!
//! Every calculation returns one [`IndicatorPoint`] per input bar so that the
//! detail chart can plot the full history, while the evaluator reads only
//! [`IndicatorSeries::latest`]. Points inside the warmup window, or whose
//! value is not finite, are marked invalid.

pub mod ema;
pub mod rsi;

pub use ema::calculate_ema;
pub use rsi::calculate_rsi;

use chrono::NaiveDate;
use std::fmt;

pub const RSI_PERIOD: usize = 14;
pub const EMA_PERIOD: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub valid: bool,
    pub value: f64,
}

impl IndicatorPoint {
    pub(crate) fn invalid(date: NaiveDate) -> Self {
        Self {
            date,
            valid: false,
            value: 0.0,
        }
    }

    pub(crate) fn computed(date: NaiveDate, value: f64) -> Self {
        Self {
            date,
            valid: value.is_finite(),
            value,
        }
    }

    pub fn as_option(&self) -> Option<f64> {
        self.valid.then_some(self.value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Ema(usize),
    Rsi(usize),
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Value at the most recent bar, or `None` when it is unavailable.
    pub fn latest(&self) -> Option<f64> {
        self.values.last().and_then(IndicatorPoint::as_option)
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
        }
    }
}
