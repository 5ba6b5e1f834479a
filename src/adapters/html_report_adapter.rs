//! HTML report adapter implementing ReportPort.
//!
//! Renders the ranked results, and the selected ticker's detail panel when
//! one is given, through Askama templates with inline SVG charts.

use std::fs;
use std::path::Path;

use askama::Template;

use crate::adapters::presentation::PanelView;
use crate::domain::detail::DetailSeries;
use crate::domain::error::SamscreenError;
use crate::domain::filter::FilterConfig;
use crate::domain::result_set::ResultSet;
use crate::ports::report_port::ReportPort;

#[derive(Template)]
#[template(path = "report.html")]
struct ReportTemplate {
    generated: String,
    panel: PanelView,
    link_rows: bool,
}

pub struct HtmlReportAdapter;

impl HtmlReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HtmlReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

pub fn render_report(
    results: &ResultSet,
    filters: &FilterConfig,
    detail: Option<&DetailSeries>,
) -> Result<String, SamscreenError> {
    let template = ReportTemplate {
        generated: chrono::Local::now().format("%Y-%m-%d %H:%M").to_string(),
        panel: PanelView::from_results(
            results,
            filters,
            detail.map(|d| d.ticker.as_str()),
            detail,
        ),
        link_rows: false,
    };
    template.render().map_err(|e| SamscreenError::Report {
        reason: e.to_string(),
    })
}

impl ReportPort for HtmlReportAdapter {
    fn write(
        &self,
        results: &ResultSet,
        filters: &FilterConfig,
        detail: Option<&DetailSeries>,
        output_path: &str,
    ) -> Result<(), SamscreenError> {
        let html = render_report(results, filters, detail)?;

        let path = Path::new(output_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, html)?;

        tracing::info!(path = output_path, "report written");
        Ok(())
    }
}
