use ka_behavior::BehaviorError;
use ka_core::{AgentId, GridPos, StructureId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("agent {agent} spawns on {cell}, which is {why}")]
    BadSpawn {
        agent: AgentId,
        cell:  GridPos,
        why:   &'static str,
    },

    #[error("agent {agent} lives at {home}, which does not exist")]
    UnknownHome {
        agent: AgentId,
        home:  StructureId,
    },

    #[error("engine error: {0}")]
    Behavior(#[from] BehaviorError),
}

pub type SimResult<T> = Result<T, SimError>;
