use thiserror::Error;

use crate::scorer::ScorerError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Scorer(#[from] ScorerError),

    #[error("input of {len} characters exceeds the {max} character limit")]
    InputTooLarge { len: usize, max: usize },

    #[error("invalid routing config: {0}")]
    InvalidConfig(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
