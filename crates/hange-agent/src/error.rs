//! Error types for remote orchestration.

use hange_core::ValidationError;
use hange_openai::OpenAiError;
use thiserror::Error;

/// Errors that can occur while working with the remote service.
#[derive(Error, Debug)]
pub enum AgentError {
    /// The operation was cancelled by the caller.
    #[error("Operation cancelled")]
    Cancelled,

    /// A bounded poll ran out of attempts.
    #[error("Too many attempts: gave up after {attempts}")]
    TooManyAttempts { attempts: u32 },

    /// The service reported that the index could not be built.
    #[error("Index {id} failed on the server")]
    IndexFailed { id: String },

    /// Some files were rejected while being added to the index.
    #[error("Failed to process files: {failed} of {total} could not be indexed")]
    FailedToProcessFiles { failed: u64, total: u64 },

    /// The model produced no usable text.
    #[error("Model returned an empty response")]
    EmptyResponse,

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// Unclassified error from the remote service.
    #[error(transparent)]
    Remote(#[from] OpenAiError),

    /// A spawned task panicked or was aborted.
    #[error("Task failed: {0}")]
    TaskFailed(String),
}

impl AgentError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, AgentError::Cancelled)
    }
}

/// Result type for orchestration.
pub type AgentResult<T> = Result<T, AgentError>;
