//! Web server adapter.
//!
//! Axum server with an HTMX-enhanced page for running scans and opening a
//! ticker's detail view. One [`Session`] is shared by every request to the
//! process.

mod error;
mod handlers;
mod templates;

pub use error::{WebError, status_from_error};
pub use handlers::*;
pub use templates::*;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::{Arc, RwLock};
use tower_http::trace::TraceLayer;

use crate::domain::error::SamscreenError;
use crate::domain::filter::FilterConfig;
use crate::domain::screener::ScanSettings;
use crate::domain::session::Session;
use crate::ports::data_port::DataPort;
use crate::ports::universe_port::UniversePort;

pub struct AppState {
    pub universe: Arc<dyn UniversePort + Send + Sync>,
    pub data: Arc<dyn DataPort + Send + Sync>,
    pub settings: ScanSettings,
    pub default_filters: FilterConfig,
    pub detail_lookback_days: i64,
    pub session: RwLock<Session>,
}

impl AppState {
    pub fn new(
        universe: Arc<dyn UniversePort + Send + Sync>,
        data: Arc<dyn DataPort + Send + Sync>,
        settings: ScanSettings,
        default_filters: FilterConfig,
        detail_lookback_days: i64,
    ) -> Self {
        Self {
            universe,
            data,
            settings,
            default_filters,
            detail_lookback_days,
            session: RwLock::new(Session::new()),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/scan", post(handlers::scan))
        .route("/detail/{ticker}", get(handlers::detail))
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

pub async fn serve(state: AppState, listen: &str) -> Result<(), SamscreenError> {
    let listener = tokio::net::TcpListener::bind(listen).await?;
    tracing::info!(address = %listener.local_addr()?, "web UI listening");
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}

fn is_htmx_request(headers: &axum::http::HeaderMap) -> bool {
    headers.get("HX-Request").is_some()
}
