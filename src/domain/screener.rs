//! Screener: universe iteration, per-ticker evaluation and ranking.
//!
//! Tickers are evaluated on a fixed-size worker pool. Each ticker's outcome is
//! independent; the final order comes from the ranking step, never from the
//! order in which workers finish.

use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{NaiveDate, TimeDelta};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::domain::error::SamscreenError;
use crate::domain::evaluator::{ExclusionReason, evaluate};
use crate::domain::filter::FilterConfig;
use crate::domain::result_set::{Candidate, RankBy, ResultSet, ScanStats};
use crate::ports::data_port::DataPort;
use crate::ports::progress_port::{ProgressPort, ScanProgress};
use crate::ports::universe_port::UniversePort;

/// Roughly six months of calendar days.
pub const SCAN_LOOKBACK_DAYS: i64 = 183;
pub const DEFAULT_WORKERS: usize = 8;
pub const MAX_WORKERS: usize = 64;
pub const DEFAULT_PROGRESS_EVERY: usize = 25;
/// Upper bound for any lookback, roughly a century.
pub const MAX_LOOKBACK_DAYS: i64 = 36_500;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanSettings {
    pub lookback_days: i64,
    pub workers: usize,
    pub progress_every: usize,
    pub rank_by: RankBy,
    /// Evaluate only the first N symbols of the universe.
    pub limit: Option<usize>,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            lookback_days: SCAN_LOOKBACK_DAYS,
            workers: DEFAULT_WORKERS,
            progress_every: DEFAULT_PROGRESS_EVERY,
            rank_by: RankBy::default(),
            limit: None,
        }
    }
}

/// Inclusive date window ending at `as_of`. A span the calendar cannot
/// represent is a configuration error, not a panic.
pub fn lookback_window(
    as_of: NaiveDate,
    days: i64,
) -> Result<(NaiveDate, NaiveDate), SamscreenError> {
    TimeDelta::try_days(days)
        .and_then(|span| as_of.checked_sub_signed(span))
        .map(|start| (start, as_of))
        .ok_or_else(|| {
            SamscreenError::invalid(
                "scan",
                "lookback_days",
                format!("lookback of {} days is out of range", days),
            )
        })
}

/// Fetch and evaluate a single ticker. Every failure becomes an exclusion.
pub fn screen_ticker(
    data: &(dyn DataPort + Sync),
    code: &str,
    filters: &FilterConfig,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<Candidate, ExclusionReason> {
    let bars = data
        .fetch_ohlcv(code, start_date, end_date)
        .map_err(|e| ExclusionReason::FetchFailed {
            reason: e.to_string(),
        })?;

    if bars.is_empty() {
        return Err(ExclusionReason::FetchFailed {
            reason: "empty payload".to_string(),
        });
    }

    evaluate(code, &bars, filters)
}

pub struct Screener<'a> {
    universe: &'a dyn UniversePort,
    data: &'a (dyn DataPort + Sync),
    settings: ScanSettings,
}

impl<'a> Screener<'a> {
    pub fn new(
        universe: &'a dyn UniversePort,
        data: &'a (dyn DataPort + Sync),
        settings: ScanSettings,
    ) -> Self {
        Self {
            universe,
            data,
            settings,
        }
    }

    fn load_universe(&self) -> Result<Vec<String>, SamscreenError> {
        let mut tickers = self.universe.fetch_tickers().map_err(|e| match e {
            SamscreenError::UniverseUnavailable { .. } => e,
            other => SamscreenError::UniverseUnavailable {
                reason: other.to_string(),
            },
        })?;

        if tickers.is_empty() {
            return Err(SamscreenError::UniverseUnavailable {
                reason: "universe source returned no symbols".to_string(),
            });
        }

        if let Some(limit) = self.settings.limit.filter(|&n| n > 0) {
            tickers.truncate(limit);
        }
        Ok(tickers)
    }

    /// Run one bounded batch scan.
    ///
    /// Fails only when the lookback window is out of range, the universe
    /// cannot be loaded (both before any ticker is evaluated) or the worker
    /// pool cannot be started.
    pub fn run(
        &self,
        filters: &FilterConfig,
        as_of: NaiveDate,
        progress: &dyn ProgressPort,
    ) -> Result<ResultSet, SamscreenError> {
        let (start_date, end_date) = lookback_window(as_of, self.settings.lookback_days)?;
        let tickers = self.load_universe()?;
        let total = tickers.len();

        info!(
            tickers = total,
            workers = self.settings.workers,
            %start_date,
            %end_date,
            filters = %filters,
            "starting scan"
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.settings.workers.max(1))
            .build()
            .map_err(|e| SamscreenError::Io(std::io::Error::other(e.to_string())))?;

        let data = self.data;
        let every = self.settings.progress_every.max(1);
        let completed = AtomicUsize::new(0);

        let outcomes: Vec<Result<Candidate, ExclusionReason>> = pool.install(|| {
            tickers
                .par_iter()
                .map(|code| {
                    let outcome = screen_ticker(data, code, filters, start_date, end_date);
                    match &outcome {
                        Ok(c) => debug!(ticker = %code, rsi = c.rsi, distance = c.ema_distance_pct, "candidate"),
                        Err(reason @ ExclusionReason::FetchFailed { .. }) => {
                            warn!(ticker = %code, %reason, "skipping ticker")
                        }
                        Err(reason) => debug!(ticker = %code, %reason, "excluded"),
                    }

                    let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                    if done % every == 0 || done == total {
                        progress.on_progress(&ScanProgress {
                            completed: done,
                            total,
                            ticker: code,
                        });
                    }
                    outcome
                })
                .collect()
        });

        let mut stats = ScanStats {
            universe_size: total,
            ..ScanStats::default()
        };
        let mut candidates = Vec::new();
        for outcome in outcomes {
            stats.record(&outcome);
            if let Ok(candidate) = outcome {
                candidates.push(candidate);
            }
        }

        info!(
            evaluated = stats.evaluated,
            passed = stats.passed,
            insufficient_history = stats.insufficient_history,
            indicator_unavailable = stats.indicator_unavailable,
            rejected = stats.rejected,
            fetch_failed = stats.fetch_failed,
            "scan complete"
        );

        Ok(ResultSet::new(candidates, self.settings.rank_by, stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::OhlcvBar;
    use crate::ports::progress_port::NoProgress;
    use chrono::Duration;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct FixedUniverse(Result<Vec<String>, String>);

    impl UniversePort for FixedUniverse {
        fn fetch_tickers(&self) -> Result<Vec<String>, SamscreenError> {
            self.0.clone().map_err(|reason| SamscreenError::UniverseUnavailable { reason })
        }
    }

    #[derive(Default)]
    struct MapData {
        bars: HashMap<String, Vec<OhlcvBar>>,
        calls: Mutex<Vec<String>>,
    }

    impl DataPort for MapData {
        fn fetch_ohlcv(
            &self,
            code: &str,
            _start_date: NaiveDate,
            _end_date: NaiveDate,
        ) -> Result<Vec<OhlcvBar>, SamscreenError> {
            self.calls.lock().unwrap().push(code.to_string());
            self.bars.get(code).cloned().ok_or_else(|| SamscreenError::DataFetch {
                code: code.to_string(),
                reason: "unknown symbol".into(),
            })
        }
    }

    fn flat_bars(code: &str, close: f64, n: usize) -> Vec<OhlcvBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..n)
            .map(|i| OhlcvBar {
                code: code.to_string(),
                date: start + Duration::days(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1_000,
            })
            .collect()
    }

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    #[test]
    fn lookback_window_spans_days() {
        let (start, end) = lookback_window(as_of(), 183).unwrap();
        assert_eq!(end, as_of());
        assert_eq!((end - start).num_days(), 183);
    }

    #[test]
    fn oversized_lookback_window_is_an_error() {
        let err = lookback_window(as_of(), 100_000_000).unwrap_err();
        assert!(matches!(err, SamscreenError::ConfigInvalid { ref key, .. } if key == "lookback_days"));
        assert!(lookback_window(as_of(), i64::MAX).is_err());
    }

    #[test]
    fn oversized_lookback_fails_scan_without_fetching() {
        let universe = FixedUniverse(Ok(vec!["AAA".into()]));
        let data = MapData::default();
        let settings = ScanSettings {
            lookback_days: 100_000_000,
            ..ScanSettings::default()
        };
        let err = Screener::new(&universe, &data, settings)
            .run(&FilterConfig::pass_all(), as_of(), &NoProgress)
            .unwrap_err();
        assert!(matches!(err, SamscreenError::ConfigInvalid { .. }));
        assert!(data.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn universe_failure_aborts_before_fetching() {
        let universe = FixedUniverse(Err("dns failure".into()));
        let data = MapData::default();
        let screener = Screener::new(&universe, &data, ScanSettings::default());

        let err = screener
            .run(&FilterConfig::pass_all(), as_of(), &NoProgress)
            .unwrap_err();
        assert!(matches!(err, SamscreenError::UniverseUnavailable { .. }));
        assert!(data.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn empty_universe_is_unavailable() {
        let universe = FixedUniverse(Ok(Vec::new()));
        let data = MapData::default();
        let screener = Screener::new(&universe, &data, ScanSettings::default());
        assert!(matches!(
            screener.run(&FilterConfig::pass_all(), as_of(), &NoProgress),
            Err(SamscreenError::UniverseUnavailable { .. })
        ));
    }

    #[test]
    fn missing_ticker_is_excluded_not_fatal() {
        let universe = FixedUniverse(Ok(vec!["AAA".into(), "MISSING".into()]));
        let mut data = MapData::default();
        data.bars.insert("AAA".into(), flat_bars("AAA", 10.0, 60));
        let screener = Screener::new(&universe, &data, ScanSettings::default());

        let results = screener
            .run(&FilterConfig::pass_all(), as_of(), &NoProgress)
            .unwrap();
        assert_eq!(results.count(), 1);
        assert_eq!(results.stats.fetch_failed, 1);
        assert_eq!(results.stats.universe_size, 2);
    }

    #[test]
    fn empty_payload_counts_as_fetch_failure() {
        let mut data = MapData::default();
        data.bars.insert("EMPTY".into(), Vec::new());
        let outcome = screen_ticker(
            &data,
            "EMPTY",
            &FilterConfig::pass_all(),
            as_of(),
            as_of(),
        );
        assert!(matches!(outcome, Err(ExclusionReason::FetchFailed { .. })));
    }

    #[test]
    fn limit_truncates_universe() {
        let universe = FixedUniverse(Ok(vec!["AAA".into(), "BBB".into(), "CCC".into()]));
        let mut data = MapData::default();
        for code in ["AAA", "BBB", "CCC"] {
            data.bars.insert(code.into(), flat_bars(code, 10.0, 60));
        }
        let settings = ScanSettings {
            limit: Some(2),
            workers: 1,
            ..ScanSettings::default()
        };
        let screener = Screener::new(&universe, &data, settings);

        let results = screener
            .run(&FilterConfig::pass_all(), as_of(), &NoProgress)
            .unwrap();
        assert_eq!(results.stats.universe_size, 2);
        let mut calls = data.calls.lock().unwrap().clone();
        calls.sort();
        assert_eq!(calls, vec!["AAA", "BBB"]);
    }
}
