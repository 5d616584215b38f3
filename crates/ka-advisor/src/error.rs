//! Advisor error type.

use thiserror::Error;

/// Failures on the advisory path.  None of these reach the simulation: a
/// malformed reply becomes an `unknown` decision and a provider failure falls
/// back to the local table.
#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("malformed advisor reply: {0}")]
    Malformed(String),

    #[error("advisor reply is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("decision provider failed: {0}")]
    Provider(String),

    #[error("advisor worker has shut down")]
    Disconnected,
}

pub type AdvisorResult<T> = Result<T, AdvisorError>;
