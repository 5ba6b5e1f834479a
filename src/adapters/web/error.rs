//! HTTP error responses for web adapter.

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::domain::error::SamscreenError;

#[derive(Debug)]
pub struct WebError {
    pub status: StatusCode,
    pub message: String,
    /// Render only the panel fragment for HTMX swaps.
    pub fragment: bool,
}

impl WebError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            fragment: false,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn as_fragment(mut self, fragment: bool) -> Self {
        self.fragment = fragment;
        self
    }
}

pub fn status_from_error(err: &SamscreenError) -> StatusCode {
    match err {
        SamscreenError::ConfigMissing { .. }
        | SamscreenError::ConfigInvalid { .. }
        | SamscreenError::ConfigParse { .. } => StatusCode::BAD_REQUEST,
        SamscreenError::UnknownTicker { .. } => StatusCode::NOT_FOUND,
        SamscreenError::NoData { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        SamscreenError::UniverseUnavailable { .. } | SamscreenError::DataFetch { .. } => {
            StatusCode::BAD_GATEWAY
        }
        SamscreenError::Report { .. } | SamscreenError::Io(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<SamscreenError> for WebError {
    fn from(err: SamscreenError) -> Self {
        Self::new(status_from_error(&err), err.to_string())
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let template = super::templates::ErrorTemplate {
            message: &self.message,
            status: self.status.as_u16(),
        };
        if self.fragment {
            return (self.status, Html(template.fragment())).into_response();
        }
        match template.render() {
            Ok(html) => (self.status, Html(html)).into_response(),
            Err(_) => (self.status, self.message).into_response(),
        }
    }
}
