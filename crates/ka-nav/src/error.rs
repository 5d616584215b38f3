//! Navigation error type.

use thiserror::Error;

use ka_core::GridPos;

/// Why a search produced no path.  Never fatal: callers back off and steer
/// directly at the goal.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NavError {
    #[error("no path from {from} to {to}")]
    NoPath { from: GridPos, to: GridPos },

    #[error("search from {from} to {to} gave up after {expansions} expansions")]
    BudgetExhausted { from: GridPos, to: GridPos, expansions: usize },

    #[error("start cell {0} is outside the map")]
    StartOutOfBounds(GridPos),
}

impl NavError {
    /// Expansions spent before failing (zero for early rejections).
    pub fn expansions(&self) -> usize {
        match self {
            NavError::BudgetExhausted { expansions, .. } => *expansions,
            _ => 0,
        }
    }
}

pub type NavResult<T> = Result<T, NavError>;
