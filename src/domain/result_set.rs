//! Candidates, ranking and the per-scan result set.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::domain::evaluator::{ExclusionReason, Snapshot, VolumeTrend};

/// A ticker that passed every active filter in one scan.
///
/// Values are kept at full precision; rounding happens only for display.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub ticker: String,
    pub price: f64,
    pub rsi: f64,
    pub ema: f64,
    pub ema_distance_pct: f64,
    pub abs_ema_distance: f64,
    pub volume: i64,
    pub volume_trend: VolumeTrend,
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl Candidate {
    pub fn from_snapshot(ticker: &str, snapshot: &Snapshot) -> Self {
        Self {
            ticker: ticker.to_string(),
            price: snapshot.price,
            rsi: snapshot.rsi,
            ema: snapshot.ema,
            ema_distance_pct: snapshot.distance_pct,
            abs_ema_distance: snapshot.abs_distance,
            volume: snapshot.volume,
            volume_trend: snapshot.volume_trend,
        }
    }

    pub fn rsi_display(&self) -> f64 {
        round2(self.rsi)
    }

    pub fn is_above_ema(&self) -> bool {
        self.ema_distance_pct > 0.0
    }
}

/// Ordering applied to a completed scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RankBy {
    /// Closest to EMA50 first.
    #[default]
    EmaDistance,
    /// Most oversold first.
    Rsi,
}

impl RankBy {
    /// Total order on candidates; ties fall back to the ticker.
    pub fn compare(self, a: &Candidate, b: &Candidate) -> Ordering {
        let primary = match self {
            RankBy::EmaDistance => a.abs_ema_distance.total_cmp(&b.abs_ema_distance),
            RankBy::Rsi => a.rsi.total_cmp(&b.rsi),
        };
        primary.then_with(|| a.ticker.cmp(&b.ticker))
    }
}

impl fmt::Display for RankBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankBy::EmaDistance => write!(f, "ema_distance"),
            RankBy::Rsi => write!(f, "rsi"),
        }
    }
}

impl FromStr for RankBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ema_distance" | "ema" => Ok(RankBy::EmaDistance),
            "rsi" => Ok(RankBy::Rsi),
            other => Err(format!("unknown ranking '{}' (expected ema_distance or rsi)", other)),
        }
    }
}

pub fn rank(candidates: &mut [Candidate], by: RankBy) {
    candidates.sort_by(|a, b| by.compare(a, b));
}

/// Exclusion counts for one scan, kept for observability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub universe_size: usize,
    pub evaluated: usize,
    pub passed: usize,
    pub insufficient_history: usize,
    pub indicator_unavailable: usize,
    pub rejected: usize,
    pub fetch_failed: usize,
}

impl ScanStats {
    pub fn record(&mut self, outcome: &Result<Candidate, ExclusionReason>) {
        self.evaluated += 1;
        match outcome {
            Ok(_) => self.passed += 1,
            Err(ExclusionReason::InsufficientHistory { .. }) => self.insufficient_history += 1,
            Err(ExclusionReason::IndicatorUnavailable { .. }) => self.indicator_unavailable += 1,
            Err(ExclusionReason::Rejected { .. }) => self.rejected += 1,
            Err(ExclusionReason::FetchFailed { .. }) => self.fetch_failed += 1,
        }
    }

    pub fn excluded(&self) -> usize {
        self.evaluated - self.passed
    }
}

/// Headline metrics shown above the results table.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSummary {
    pub matches: usize,
    pub lowest_rsi: f64,
    pub best_entry: String,
}

/// Ranked candidates for one completed scan. Replaced, never merged, by the next scan.
#[derive(Debug, Clone)]
pub struct ResultSet {
    candidates: Vec<Candidate>,
    rank_by: RankBy,
    pub stats: ScanStats,
}

impl ResultSet {
    pub fn new(mut candidates: Vec<Candidate>, rank_by: RankBy, stats: ScanStats) -> Self {
        rank(&mut candidates, rank_by);
        Self {
            candidates,
            rank_by,
            stats,
        }
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn rank_by(&self) -> RankBy {
        self.rank_by
    }

    pub fn count(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn get(&self, ticker: &str) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.ticker == ticker)
    }

    /// `None` for an empty result set.
    pub fn summary(&self) -> Option<ResultSummary> {
        let best = self
            .candidates
            .iter()
            .min_by(|a, b| RankBy::Rsi.compare(a, b))?;
        Some(ResultSummary {
            matches: self.count(),
            lowest_rsi: round2(best.rsi),
            best_entry: best.ticker.clone(),
        })
    }
}
