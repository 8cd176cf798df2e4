//! Error types for hosted LLM service operations.

use thiserror::Error;

/// Errors that can occur when talking to the service.
#[derive(Error, Debug)]
pub enum OpenAiError {
    /// Unable to reach the API host.
    #[error("Service is not reachable at {base_url}")]
    ServerUnreachable { base_url: String },

    /// Request timeout.
    #[error("Request timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    /// The credential was rejected.
    #[error("Authentication failed: {message}. Run 'hange auth' with a valid token.")]
    Unauthorized { message: String },

    /// API returned an error response.
    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for service operations.
pub type OpenAiResult<T> = Result<T, OpenAiError>;
