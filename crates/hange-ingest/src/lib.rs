//! Hange Ingest - File ingestion pipeline.
//!
//! This crate provides:
//! - Path resolution (files and directories, walked recursively)
//! - A bounded pool of async readers streaming file contents
//! - The pipeline composing both into a single producer

mod error;
mod pipeline;
mod provider;
mod reader;
mod resolver;

pub use error::{IngestError, IngestResult};
pub use pipeline::IngestionPipeline;
pub use provider::{ContentProvider, FsContentProvider};
pub use reader::{BoundedFileReader, Completion, FileStream, ReaderConfig};
pub use resolver::PathResolver;
