//! HTML templates using Askama.

use askama::Template;

use crate::adapters::presentation::PanelView;
use crate::domain::filter::FilterConfig;

/// Filter form values, pre-filled from the last scan or the configured defaults.
#[derive(Debug, Clone)]
pub struct FormView {
    pub use_rsi: bool,
    pub rsi_threshold: String,
    pub use_ema: bool,
    pub ema_tolerance_pct: String,
    pub use_volume: bool,
}

impl From<&FilterConfig> for FormView {
    fn from(filters: &FilterConfig) -> Self {
        Self {
            use_rsi: filters.use_rsi,
            rsi_threshold: filters.rsi_threshold.to_string(),
            use_ema: filters.use_ema,
            ema_tolerance_pct: filters.ema_tolerance_pct.to_string(),
            use_volume: filters.use_volume,
        }
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub form: FormView,
    pub panel: PanelView,
    pub link_rows: bool,
}

/// The results panel alone, swapped in by HTMX requests.
#[derive(Template)]
#[template(path = "panel.html")]
pub struct PanelTemplate {
    pub panel: PanelView,
    pub link_rows: bool,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate<'a> {
    pub message: &'a str,
    pub status: u16,
}

impl ErrorTemplate<'_> {
    pub fn fragment(&self) -> String {
        format!(
            "<section id=\"results\"><p class=\"error\">Error {}: {}</p></section>",
            self.status,
            escape(self.message)
        )
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_view_mirrors_filters() {
        let form = FormView::from(&FilterConfig {
            use_ema: false,
            ema_tolerance_pct: 3.5,
            ..FilterConfig::default()
        });
        assert!(form.use_rsi);
        assert!(!form.use_ema);
        assert_eq!(form.rsi_threshold, "30");
        assert_eq!(form.ema_tolerance_pct, "3.5");
    }

    #[test]
    fn error_fragment_escapes_message() {
        let template = ErrorTemplate {
            message: "<bad> & worse",
            status: 400,
        };
        assert_eq!(
            template.fragment(),
            "<section id=\"results\"><p class=\"error\">Error 400: &lt;bad&gt; &amp; worse</p></section>"
        );
    }

    #[test]
    fn panel_template_renders_idle_prompt() {
        let html = PanelTemplate {
            panel: PanelView::idle(&FilterConfig::default()),
            link_rows: true,
        }
        .render()
        .unwrap();
        assert!(html.contains("No scan yet"));
        assert!(html.contains("id=\"results\""));
    }
}
