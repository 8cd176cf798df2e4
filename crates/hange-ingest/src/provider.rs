//! Sources of file content.

use crate::error::{IngestError, IngestResult};
use async_trait::async_trait;
use std::io;
use std::path::Path;

/// Reads the full content of a file.
#[async_trait]
pub trait ContentProvider: Send + Sync + 'static {
    async fn read(&self, path: &Path) -> IngestResult<Vec<u8>>;
}

/// Reads content from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsContentProvider;

#[async_trait]
impl ContentProvider for FsContentProvider {
    async fn read(&self, path: &Path) -> IngestResult<Vec<u8>> {
        tokio::fs::read(path).await.map_err(|e| match e.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
                IngestError::from_io(path, e)
            }
            _ => IngestError::ContentRead {
                path: path.to_path_buf(),
                source: e,
            },
        })
    }
}
