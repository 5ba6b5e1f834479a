//! Domain error types.

/// Top-level error type for samscreen.
///
/// Only failures that abort a whole operation live here. Per-ticker
/// problems during a scan are reported as
/// [`ExclusionReason`](crate::domain::evaluator::ExclusionReason) instead.
#[derive(Debug, thiserror::Error)]
pub enum SamscreenError {
    #[error("ticker universe unavailable: {reason}")]
    UniverseUnavailable { reason: String },

    #[error("failed to fetch data for {code}: {reason}")]
    DataFetch { code: String, reason: String },

    #[error("no data for {code}")]
    NoData { code: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("{code} is not part of the current result set")]
    UnknownTicker { code: String },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SamscreenError {
    pub fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        SamscreenError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&SamscreenError> for std::process::ExitCode {
    fn from(err: &SamscreenError) -> Self {
        let code: u8 = match err {
            SamscreenError::Io(_) | SamscreenError::Report { .. } => 1,
            SamscreenError::ConfigParse { .. }
            | SamscreenError::ConfigMissing { .. }
            | SamscreenError::ConfigInvalid { .. } => 2,
            SamscreenError::UniverseUnavailable { .. } => 3,
            SamscreenError::DataFetch { .. }
            | SamscreenError::NoData { .. }
            | SamscreenError::UnknownTicker { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
