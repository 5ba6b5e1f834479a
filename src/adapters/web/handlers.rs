//! HTTP request handlers for web adapter.

use askama::Template;
use axum::{
    Form,
    extract::{Path, State},
    http::HeaderMap,
    response::{Html, IntoResponse, Response},
};
use std::sync::Arc;

use crate::adapters::presentation::PanelView;
use crate::domain::config_validation::validate_filter_config;
use crate::domain::detail::load_detail;
use crate::domain::filter::FilterConfig;
use crate::domain::screener::Screener;
use crate::domain::session::{Session, SessionView};
use crate::ports::progress_port::LogProgress;

use super::templates::{FormView, IndexTemplate, PanelTemplate};
use super::{AppState, WebError, is_htmx_request};

fn read_session(state: &AppState) -> Result<std::sync::RwLockReadGuard<'_, Session>, WebError> {
    state
        .session
        .read()
        .map_err(|_| WebError::internal("session lock poisoned"))
}

fn write_session(
    state: &AppState,
) -> Result<std::sync::RwLockWriteGuard<'_, Session>, WebError> {
    state
        .session
        .write()
        .map_err(|_| WebError::internal("session lock poisoned"))
}

fn panel_for(session: &Session, defaults: &FilterConfig) -> PanelView {
    match session.view() {
        SessionView::Idle => PanelView::idle(defaults),
        SessionView::NoMatches { filters } => {
            let results = session.results();
            match results {
                Some(results) => PanelView::from_results(results, filters, None, None),
                None => PanelView::idle(filters),
            }
        }
        SessionView::Results {
            results,
            filters,
            selected,
            detail,
        } => PanelView::from_results(results, filters, selected, detail),
    }
}

/// Full page, or only the results panel when HTMX is swapping it in.
fn render_page(state: &AppState, headers: &HeaderMap) -> Result<Response, WebError> {
    let session = read_session(state)?;
    let filters = session.filters().copied().unwrap_or(state.default_filters);
    let panel = panel_for(&session, &state.default_filters);
    drop(session);

    let html = if is_htmx_request(headers) {
        PanelTemplate {
            panel,
            link_rows: true,
        }
        .render()
    } else {
        IndexTemplate {
            form: FormView::from(&filters),
            panel,
            link_rows: true,
        }
        .render()
    }
    .map_err(|e| WebError::internal(e.to_string()))?;

    Ok(Html(html).into_response())
}

pub async fn index(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, WebError> {
    render_page(&state, &headers)
}

/// Unchecked checkboxes are absent from the form body.
#[derive(Debug, serde::Deserialize)]
pub struct ScanForm {
    pub use_rsi: Option<String>,
    pub rsi_threshold: String,
    pub use_ema: Option<String>,
    pub ema_tolerance_pct: String,
    pub use_volume: Option<String>,
}

impl ScanForm {
    pub fn to_filters(&self) -> Result<FilterConfig, WebError> {
        let rsi_threshold: f64 = self
            .rsi_threshold
            .trim()
            .parse()
            .map_err(|_| WebError::bad_request("Invalid RSI threshold"))?;
        let ema_tolerance_pct: f64 = self
            .ema_tolerance_pct
            .trim()
            .parse()
            .map_err(|_| WebError::bad_request("Invalid EMA tolerance"))?;

        let filters = FilterConfig {
            use_rsi: self.use_rsi.is_some(),
            rsi_threshold,
            use_ema: self.use_ema.is_some(),
            ema_tolerance_pct,
            use_volume: self.use_volume.is_some(),
        };
        validate_filter_config(&filters)?;
        Ok(filters)
    }
}

pub async fn scan(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<ScanForm>,
) -> Result<Response, WebError> {
    let htmx = is_htmx_request(&headers);
    let filters = form.to_filters().map_err(|e| e.as_fragment(htmx))?;

    let worker = Arc::clone(&state);
    let results = tokio::task::spawn_blocking(move || {
        let as_of = chrono::Local::now().date_naive();
        let screener = Screener::new(&*worker.universe, &*worker.data, worker.settings);
        screener.run(&filters, as_of, &LogProgress)
    })
    .await
    .map_err(|e| WebError::internal(format!("scan task failed: {}", e)).as_fragment(htmx))?
    .map_err(|e| WebError::from(e).as_fragment(htmx))?;

    write_session(&state)?.replace_results(results, filters);
    render_page(&state, &headers)
}

pub async fn detail(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
    headers: HeaderMap,
) -> Result<Response, WebError> {
    let htmx = is_htmx_request(&headers);
    let token = write_session(&state)?
        .select(&ticker)
        .map_err(|e| WebError::from(e).as_fragment(htmx))?;

    let worker = Arc::clone(&state);
    let code = ticker.clone();
    let series = tokio::task::spawn_blocking(move || {
        let as_of = chrono::Local::now().date_naive();
        load_detail(&*worker.data, &code, as_of, worker.detail_lookback_days)
    })
    .await
    .map_err(|e| WebError::internal(format!("detail task failed: {}", e)).as_fragment(htmx))?
    .map_err(|e| WebError::from(e).as_fragment(htmx))?;

    if !write_session(&state)?.install_detail(token, series) {
        tracing::debug!(ticker = %ticker, "discarding stale detail");
    }
    render_page(&state, &headers)
}

pub async fn not_found() -> WebError {
    WebError::not_found("Page not found")
}
