//! Hange OpenAI - HTTP client for the hosted LLM service.
//!
//! This crate covers the endpoints hange needs: file uploads, vector stores
//! and their file batches, and the responses endpoint used for generation.

mod client;
mod error;
mod types;

pub use client::OpenAiClient;
pub use error::{OpenAiError, OpenAiResult};
pub use types::*;
