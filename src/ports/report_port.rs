//! Report generation port trait.

use crate::domain::detail::DetailSeries;
use crate::domain::error::SamscreenError;
use crate::domain::filter::FilterConfig;
use crate::domain::result_set::ResultSet;

/// Port for writing a scan's ranked results, optionally with the detail
/// view of the selected ticker.
pub trait ReportPort {
    fn write(
        &self,
        results: &ResultSet,
        filters: &FilterConfig,
        detail: Option<&DetailSeries>,
        output_path: &str,
    ) -> Result<(), SamscreenError>;
}
