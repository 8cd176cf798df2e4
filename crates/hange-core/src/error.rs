//! Validation errors for core inputs.

use thiserror::Error;

/// Errors raised when an input cannot be used to build an LLM request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("provided empty input: {0}")]
    EmptyInput(String),

    #[error("either status or staged status should be provided")]
    MissingStatus,
}

/// Result type alias for validation.
pub type ValidationResult<T> = Result<T, ValidationError>;
