use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScorerError {
    #[error("model artifact unavailable at {path}: {source}")]
    ModelUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("model artifact {path} is corrupt: {detail}")]
    CorruptArtifact { path: PathBuf, detail: String },
}

pub type ScorerResult<T> = Result<T, ScorerError>;
