//! Scan progress reporting.

/// Snapshot of how far a scan has got.
#[derive(Debug, Clone, Copy)]
pub struct ScanProgress<'a> {
    pub completed: usize,
    pub total: usize,
    pub ticker: &'a str,
}

impl ScanProgress<'_> {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

/// Observer for scan progress. Called from worker threads, possibly out of
/// ticker order, and not necessarily after every ticker.
pub trait ProgressPort: Sync {
    fn on_progress(&self, progress: &ScanProgress<'_>);
}

/// Discards progress updates.
pub struct NoProgress;

impl ProgressPort for NoProgress {
    fn on_progress(&self, _progress: &ScanProgress<'_>) {}
}

/// Emits progress as structured log events.
pub struct LogProgress;

impl ProgressPort for LogProgress {
    fn on_progress(&self, progress: &ScanProgress<'_>) {
        tracing::info!(
            completed = progress.completed,
            total = progress.total,
            ticker = progress.ticker,
            "analysed {:.0}%",
            progress.fraction() * 100.0
        );
    }
}
