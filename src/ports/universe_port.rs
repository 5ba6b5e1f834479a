//! Ticker-universe port trait.

use crate::domain::error::SamscreenError;

pub trait UniversePort {
    /// Ordered symbol list. Any failure is reported as
    /// [`SamscreenError::UniverseUnavailable`] and aborts the scan.
    fn fetch_tickers(&self) -> Result<Vec<String>, SamscreenError>;
}
