//! Core domain types for hange.

use crate::error::{ValidationError, ValidationResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// A file read from disk, handed to exactly one consumer.
///
/// Fields are private so a record cannot change after the reader built it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    path: PathBuf,
    data: Vec<u8>,
}

impl FileRecord {
    /// Create a new record.
    pub fn new(path: impl Into<PathBuf>, data: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            data,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Size of the content in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The path rendered as a string.
    ///
    /// Used as the remote filename, so relative paths keep the folder
    /// structure visible to the model.
    pub fn display_name(&self) -> String {
        self.path.to_string_lossy().to_string()
    }

    /// Consume the record, returning its content.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

/// Handle of a file accepted by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedResource {
    pub id: String,
    pub filename: String,
}

impl UploadedResource {
    pub fn new(id: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            filename: filename.into(),
        }
    }
}

/// Processing state of a server-side index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexStatus {
    InProgress,
    Completed,
    Failed,
}

impl IndexStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexStatus::InProgress => "in_progress",
            IndexStatus::Completed => "completed",
            IndexStatus::Failed => "failed",
        }
    }

    /// Whether the index left the in-progress state.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, IndexStatus::InProgress)
    }
}

impl std::fmt::Display for IndexStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-file processing counters reported by the index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCounts {
    pub total: u64,
    pub in_progress: u64,
    pub completed: u64,
    pub failed: u64,
    #[serde(default)]
    pub cancelled: u64,
}

impl FileCounts {
    /// Number of files that reached a terminal state.
    pub fn processed(&self) -> u64 {
        self.total.saturating_sub(self.in_progress)
    }
}

/// Server-side searchable index over uploaded files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexHandle {
    pub id: String,
    pub status: IndexStatus,
    #[serde(default)]
    pub file_counts: FileCounts,
}

impl IndexHandle {
    /// A freshly created, empty index.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: IndexStatus::InProgress,
            file_counts: FileCounts::default(),
        }
    }

    pub fn with_status(mut self, status: IndexStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_file_counts(mut self, file_counts: FileCounts) -> Self {
        self.file_counts = file_counts;
        self
    }
}

/// Repository state used to write a commit message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitContext {
    /// Free text from the user, like a task description. Can be empty.
    pub user_input: String,
    /// Porcelain status, including unstaged changes. No file content.
    pub status: String,
    /// Stat of the staged changes only.
    pub staged_status: String,
    /// Unified diff of the staged changes.
    pub diff: String,
}

impl CommitContext {
    /// Check that there is enough data to describe the change.
    pub fn validate(&self) -> ValidationResult<()> {
        let status = self.status.trim();
        let staged_status = self.staged_status.trim();

        if status.is_empty() && staged_status.is_empty() {
            return Err(ValidationError::MissingStatus);
        }

        if status.is_empty() {
            warn!("Status is not provided, quality of response may be reduced");
        }

        if staged_status.is_empty() {
            warn!("Staged status is not provided, quality of response may be reduced");
        }

        if self.diff.trim().is_empty() {
            return Err(ValidationError::EmptyInput(
                "git diff. LLM can't construct commit message".to_string(),
            ));
        }

        Ok(())
    }
}
