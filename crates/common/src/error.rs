//! Error types for StepDiff

use thiserror::Error;

/// Result type alias using StepDiff Error
pub type Result<T> = std::result::Result<T, Error>;

/// StepDiff error types
///
/// Only backend unavailability is fatal to a comparison request. Data-shape
/// problems (missing metaInfo, empty step lists, absent attachments) are
/// degraded in place by the engine and never surface through this enum.
#[derive(Error, Debug)]
pub enum Error {
    #[error("backend unavailable: {0}")]
    Backend(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: String, id: String },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub fn not_found(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Error::NotFound {
            kind: kind.into(),
            id: id.into(),
        }
    }
}
