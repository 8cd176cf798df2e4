//! Error types for the ingestion pipeline.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for ingestion operations.
pub type IngestResult<T> = Result<T, IngestError>;

/// Errors that can occur during ingestion.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("failed to process path {}: file does not exist", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to process path {}: permission denied", path.display())]
    PermissionDenied { path: PathBuf },

    #[error("failed to process path {}: {source}", path.display())]
    Path { path: PathBuf, source: io::Error },

    #[error("failed to read content of {}: {source}", path.display())]
    ContentRead { path: PathBuf, source: io::Error },

    #[error("invalid ignore pattern {pattern}: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("operation cancelled")]
    Cancelled,

    #[error("reader worker failed: {0}")]
    WorkerFailed(String),
}

impl IngestError {
    /// Map an OS error on `path` into the path taxonomy.
    ///
    /// Not-found and permission errors get their own variants; anything else
    /// passes through with the path attached.
    pub fn from_io(path: impl Into<PathBuf>, err: io::Error) -> Self {
        let path = path.into();
        match err.kind() {
            io::ErrorKind::NotFound => IngestError::NotFound { path },
            io::ErrorKind::PermissionDenied => IngestError::PermissionDenied { path },
            _ => IngestError::Path { path, source: err },
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, IngestError::Cancelled)
    }
}
