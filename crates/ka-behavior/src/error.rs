use ka_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BehaviorError {
    #[error("behavior configuration error: {0}")]
    Config(#[from] CoreError),
}

pub type BehaviorResult<T> = Result<T, BehaviorError>;
