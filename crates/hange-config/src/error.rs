//! Configuration error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Config directory not found")]
    NoConfigDir,

    #[error("Unknown config key: {0}")]
    UnknownKey(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Empty token")]
    EmptyToken,

    #[error("Auth token is not set. Run 'hange auth' first.")]
    TokenNotSet,

    #[error("Stored auth token is malformed: {0}")]
    MalformedToken(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
