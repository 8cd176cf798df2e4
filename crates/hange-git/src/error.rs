//! Error types for git commands.

use thiserror::Error;

/// Result type for git operations.
pub type GitResult<T> = Result<T, GitError>;

/// Errors that can occur while running git.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Tool not found: {tool}. Please install it.")]
    ToolNotFound { tool: String },

    #[error("'{command}' failed with exit code {code}:\n{output}")]
    CommandFailed {
        command: String,
        code: i32,
        output: String,
    },

    #[error("'{command}' was terminated by a signal")]
    Terminated { command: String },
}
