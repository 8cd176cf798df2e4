//! Hange Config - Configuration and credential management for hange.

mod config;
mod credentials;
mod error;
mod paths;

pub use config::*;
pub use credentials::{decode_token, encode_token, TOKEN_ENV_VAR};
pub use error::{ConfigError, ConfigResult};
pub use paths::{AppPaths, CONFIG_ENV_VAR};
