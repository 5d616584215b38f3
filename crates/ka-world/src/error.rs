//! World-state error type.

use thiserror::Error;

use ka_core::{AgentId, GridPos, ObjectiveId};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorldError {
    #[error("objective {0} not found")]
    ObjectiveNotFound(ObjectiveId),

    #[error("objective {id} already claimed by {by}")]
    AlreadyClaimed { id: ObjectiveId, by: AgentId },

    #[error("cell {0} is outside the map")]
    OutOfBounds(GridPos),
}

pub type WorldResult<T> = Result<T, WorldError>;
