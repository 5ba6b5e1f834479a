//! Market-data port trait.

use crate::domain::error::SamscreenError;
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;

/// Source of daily bars for one symbol.
///
/// Implementations return bars in ascending date order, restricted to
/// `start_date..=end_date`. An empty vector is a valid answer; callers
/// decide whether that excludes the symbol.
pub trait DataPort {
    fn fetch_ohlcv(
        &self,
        code: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, SamscreenError>;
}
