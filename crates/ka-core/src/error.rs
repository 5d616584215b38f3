//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` where a core
//! failure (usually configuration) can surface through them.

use thiserror::Error;

use crate::AgentId;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("agent {0} not found")]
    AgentNotFound(AgentId),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for `ka-core`.
pub type CoreResult<T> = Result<T, CoreError>;
