//! Per-symbol evaluation: indicator snapshot plus the three filter criteria.
//!
//! A ticker becomes a [`Candidate`] only when every enabled criterion passes.
//! Disabled criteria always pass but their values are still computed and
//! carried into the candidate for display and ranking.

use std::fmt;

use crate::domain::filter::{Criterion, FilterConfig};
use crate::domain::indicator::{
    EMA_PERIOD, IndicatorType, RSI_PERIOD, calculate_ema, calculate_rsi,
};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::result_set::Candidate;

/// Minimum history for a stable EMA(50) and RSI warmup.
pub const MIN_HISTORY_BARS: usize = 50;

/// Bars per volume window; the trend compares the last window with the one before it.
pub const VOLUME_WINDOW: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeTrend {
    Rising,
    NotRising,
}

impl VolumeTrend {
    pub fn is_rising(self) -> bool {
        self == VolumeTrend::Rising
    }
}

/// Why a ticker did not produce a candidate. None of these abort a scan.
#[derive(Debug, Clone, PartialEq)]
pub enum ExclusionReason {
    InsufficientHistory { bars: usize },
    IndicatorUnavailable { indicator: IndicatorType },
    Rejected { failed: Vec<Criterion> },
    FetchFailed { reason: String },
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExclusionReason::InsufficientHistory { bars } => write!(
                f,
                "insufficient history ({} bars, need {})",
                bars, MIN_HISTORY_BARS
            ),
            ExclusionReason::IndicatorUnavailable { indicator } => {
                write!(f, "{} unavailable", indicator)
            }
            ExclusionReason::Rejected { failed } => {
                let names: Vec<String> = failed.iter().map(|c| c.to_string()).collect();
                write!(f, "rejected by {}", names.join(", "))
            }
            ExclusionReason::FetchFailed { reason } => write!(f, "fetch failed: {}", reason),
        }
    }
}

/// Indicator values at the most recent bar, independent of any filter settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub price: f64,
    pub rsi: f64,
    pub ema: f64,
    pub distance_pct: f64,
    pub abs_distance: f64,
    pub volume: i64,
    pub volume_trend: VolumeTrend,
}

/// Pass/fail per criterion after applying the enabled flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CriteriaResult {
    pub rsi: bool,
    pub ema: bool,
    pub volume: bool,
}

impl CriteriaResult {
    pub fn all_pass(&self) -> bool {
        self.rsi && self.ema && self.volume
    }

    pub fn failed(&self) -> Vec<Criterion> {
        [
            (self.rsi, Criterion::Rsi),
            (self.ema, Criterion::EmaProximity),
            (self.volume, Criterion::VolumeTrend),
        ]
        .into_iter()
        .filter(|(pass, _)| !pass)
        .map(|(_, c)| c)
        .collect()
    }
}

fn mean_volume(bars: &[OhlcvBar]) -> f64 {
    bars.iter().map(|b| b.volume as f64).sum::<f64>() / bars.len() as f64
}

/// Rising iff mean volume over the last window is strictly greater than over
/// the window immediately preceding it. `None` when there are too few bars.
pub fn volume_trend(bars: &[OhlcvBar]) -> Option<VolumeTrend> {
    if bars.len() < 2 * VOLUME_WINDOW {
        return None;
    }
    let split = bars.len() - VOLUME_WINDOW;
    let recent = mean_volume(&bars[split..]);
    let prior = mean_volume(&bars[split - VOLUME_WINDOW..split]);
    Some(if recent > prior {
        VolumeTrend::Rising
    } else {
        VolumeTrend::NotRising
    })
}

/// Signed percentage distance of `price` from `ema`; positive means above.
pub fn ema_distance_pct(price: f64, ema: f64) -> f64 {
    (price - ema) / ema * 100.0
}

pub fn compute_snapshot(bars: &[OhlcvBar]) -> Result<Snapshot, ExclusionReason> {
    let last = bars.last().ok_or(ExclusionReason::InsufficientHistory { bars: 0 })?;

    let rsi = calculate_rsi(bars, RSI_PERIOD)
        .latest()
        .ok_or(ExclusionReason::IndicatorUnavailable {
            indicator: IndicatorType::Rsi(RSI_PERIOD),
        })?;

    let ema_unavailable = ExclusionReason::IndicatorUnavailable {
        indicator: IndicatorType::Ema(EMA_PERIOD),
    };
    let ema = calculate_ema(bars, EMA_PERIOD)
        .latest()
        .ok_or_else(|| ema_unavailable.clone())?;

    let distance_pct = ema_distance_pct(last.close, ema);
    if !distance_pct.is_finite() {
        return Err(ema_unavailable);
    }

    let volume_trend = volume_trend(bars).ok_or(ExclusionReason::InsufficientHistory {
        bars: bars.len(),
    })?;

    Ok(Snapshot {
        price: last.close,
        rsi,
        ema,
        distance_pct,
        abs_distance: distance_pct.abs(),
        volume: last.volume,
        volume_trend,
    })
}

/// Both thresholds are inclusive: a value equal to the limit passes.
pub fn check_criteria(snapshot: &Snapshot, config: &FilterConfig) -> CriteriaResult {
    CriteriaResult {
        rsi: !config.use_rsi || snapshot.rsi <= config.rsi_threshold,
        ema: !config.use_ema || snapshot.abs_distance <= config.ema_tolerance_pct,
        volume: !config.use_volume || snapshot.volume_trend.is_rising(),
    }
}

/// Evaluate one ticker's series against the filter configuration.
pub fn evaluate(
    code: &str,
    bars: &[OhlcvBar],
    config: &FilterConfig,
) -> Result<Candidate, ExclusionReason> {
    if bars.len() < MIN_HISTORY_BARS {
        return Err(ExclusionReason::InsufficientHistory { bars: bars.len() });
    }

    let snapshot = compute_snapshot(bars)?;
    let criteria = check_criteria(&snapshot, config);
    if !criteria.all_pass() {
        return Err(ExclusionReason::Rejected {
            failed: criteria.failed(),
        });
    }

    Ok(Candidate::from_snapshot(code, &snapshot))
}
