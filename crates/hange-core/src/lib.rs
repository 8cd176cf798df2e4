//! Hange Core - Shared data model for the hange developer CLI.

mod error;
mod types;

pub use error::{ValidationError, ValidationResult};
pub use types::*;
