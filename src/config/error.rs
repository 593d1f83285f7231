use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid TOML syntax: {0}")]
    InvalidToml(#[from] toml::de::Error),

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Failed to get home directory")]
    NoHomeDirectory,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
