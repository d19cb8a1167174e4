use thiserror::Error;

/// Failures that are worth reporting.
///
/// The expected degradations (absent surfaces, empty content, degenerate
/// geometry, coalesced notifications) are not errors; see
/// [`crate::SkipReason`] and `runtime::Notification`.
#[derive(Debug, Error)]
pub enum OverviewError {
    #[error("invalid overview config: {0}")]
    Config(String),

    #[error("overview markup is not well-formed: {0}")]
    Markup(String),

    #[error("overview surface error: {0}")]
    Surface(String),
}

impl From<serde_json::Error> for OverviewError {
    fn from(err: serde_json::Error) -> Self {
        OverviewError::Config(err.to_string())
    }
}

impl From<roxmltree::Error> for OverviewError {
    fn from(err: roxmltree::Error) -> Self {
        OverviewError::Markup(err.to_string())
    }
}

pub type Result<T, E = OverviewError> = std::result::Result<T, E>;
