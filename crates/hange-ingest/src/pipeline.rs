//! Path resolution followed by bounded reads, exposed as one producer.

use crate::error::IngestResult;
use crate::provider::{ContentProvider, FsContentProvider};
use crate::reader::{BoundedFileReader, FileStream, ReaderConfig};
use crate::resolver::PathResolver;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Turns user-supplied paths into a stream of file records.
pub struct IngestionPipeline<P = FsContentProvider> {
    resolver: PathResolver,
    reader: BoundedFileReader<P>,
}

impl IngestionPipeline<FsContentProvider> {
    /// Pipeline reading from the local filesystem.
    pub fn from_fs(resolver: PathResolver) -> Self {
        Self::new(resolver, BoundedFileReader::new(FsContentProvider))
    }
}

impl<P: ContentProvider> IngestionPipeline<P> {
    pub fn new(resolver: PathResolver, reader: BoundedFileReader<P>) -> Self {
        Self { resolver, reader }
    }

    /// Resolve `paths`, then start streaming their contents.
    ///
    /// Resolution failures are returned before any read starts.
    pub fn read(
        &self,
        token: &CancellationToken,
        paths: &[PathBuf],
        config: ReaderConfig,
    ) -> IngestResult<FileStream> {
        let files = self.resolver.resolve(token, paths)?;
        info!("Found {} file(s) to read", files.len());

        Ok(self.reader.read(token, files, config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IngestError;
    use std::fs;

    #[tokio::test]
    async fn test_pipeline_reads_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("pkg")).unwrap();
        fs::write(dir.path().join("main.go"), "package main").unwrap();
        fs::write(dir.path().join("pkg/util.go"), "package pkg").unwrap();

        let pipeline = IngestionPipeline::from_fs(PathResolver::default());
        let (mut files, done) = pipeline
            .read(
                &CancellationToken::new(),
                &[dir.path().to_path_buf()],
                ReaderConfig::new(2, 2),
            )
            .unwrap()
            .into_parts();

        let mut got = Vec::new();
        while let Some(record) = files.recv().await {
            got.push(record);
        }
        got.sort_by(|a, b| a.path().cmp(b.path()));

        assert!(done.wait().await.is_ok());
        assert_eq!(got.len(), 2);
        assert_eq!(got[0].data(), b"package main");
        assert_eq!(got[1].data(), b"package pkg");
    }

    #[tokio::test]
    async fn test_pipeline_fails_fast_on_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = IngestionPipeline::from_fs(PathResolver::default());

        let result = pipeline.read(
            &CancellationToken::new(),
            &[dir.path().join("ghost")],
            ReaderConfig::new(1, 1),
        );

        assert!(matches!(result, Err(IngestError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_pipeline_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = IngestionPipeline::from_fs(PathResolver::default());

        let (mut files, done) = pipeline
            .read(&CancellationToken::new(), &[dir.path().to_path_buf()], ReaderConfig::auto())
            .unwrap()
            .into_parts();

        assert!(files.recv().await.is_none());
        assert!(done.wait().await.is_ok());
    }
}
