//! Bounded pool of async file readers.
//!
//! Workers share a lock-free cursor into the path list: each one claims the
//! next unclaimed index with an atomic increment, reads the file and publishes
//! the record on a bounded channel. The first failing worker cancels the
//! group so its siblings stop at their next check.

use crate::error::{IngestError, IngestResult};
use crate::provider::ContentProvider;
use hange_core::FileRecord;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Sizing of the reader pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Number of concurrent readers. Clamped to at least 1.
    pub workers: usize,
    /// Capacity of the output channel. Clamped to at least 1.
    pub buffer_size: usize,
}

impl ReaderConfig {
    pub fn new(workers: usize, buffer_size: usize) -> Self {
        Self {
            workers: workers.max(1),
            buffer_size: buffer_size.max(1),
        }
    }

    /// One reader per CPU minus one kept free for the consumer, buffer of two
    /// records per reader.
    pub fn auto() -> Self {
        let cpus = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let workers = cpus.saturating_sub(1).max(1);
        Self::new(workers, workers * 2)
    }

    /// Start from [`ReaderConfig::auto`], replacing any non-zero value.
    pub fn with_overrides(workers: usize, buffer_size: usize) -> Self {
        let auto = Self::auto();
        let workers = if workers == 0 { auto.workers } else { workers };
        let buffer_size = if buffer_size == 0 { workers * 2 } else { buffer_size };
        Self::new(workers, buffer_size)
    }
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self::auto()
    }
}

/// Completion signal of a read, resolved after the output stream closed.
#[derive(Debug)]
pub struct Completion(oneshot::Receiver<IngestResult<()>>);

impl Completion {
    /// Wait for every worker to exit. Returns the first worker error.
    pub async fn wait(self) -> IngestResult<()> {
        self.0.await.unwrap_or_else(|_| {
            Err(IngestError::WorkerFailed(
                "reader supervisor exited without a result".to_string(),
            ))
        })
    }
}

/// Output of a read: the record stream plus its completion signal.
#[derive(Debug)]
pub struct FileStream {
    pub files: mpsc::Receiver<FileRecord>,
    pub done: Completion,
}

impl FileStream {
    pub fn into_parts(self) -> (mpsc::Receiver<FileRecord>, Completion) {
        (self.files, self.done)
    }
}

/// Reads files with a fixed number of concurrent workers.
pub struct BoundedFileReader<P> {
    provider: Arc<P>,
}

impl<P> Clone for BoundedFileReader<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
        }
    }
}

impl<P: ContentProvider> BoundedFileReader<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider: Arc::new(provider),
        }
    }

    /// Start reading `paths`. Must be called within a tokio runtime.
    ///
    /// Records arrive in no particular order. The stream is closed once all
    /// workers have exited, and only then is the completion signal resolved.
    pub fn read(
        &self,
        token: &CancellationToken,
        paths: Vec<PathBuf>,
        config: ReaderConfig,
    ) -> FileStream {
        let config = ReaderConfig::new(config.workers, config.buffer_size);
        let (tx, rx) = mpsc::channel(config.buffer_size);
        let (done_tx, done_rx) = oneshot::channel();

        if paths.is_empty() {
            drop(tx);
            let _ = done_tx.send(Ok(()));
            return FileStream {
                files: rx,
                done: Completion(done_rx),
            };
        }

        debug!(
            "Reading {} file(s) with {} worker(s), buffer {}",
            paths.len(),
            config.workers,
            config.buffer_size
        );

        let group = token.child_token();
        let paths = Arc::new(paths);
        let cursor = Arc::new(AtomicUsize::new(0));
        let first_error = Arc::new(Mutex::new(None));

        let mut workers = JoinSet::new();
        for id in 0..config.workers {
            let worker = Worker {
                id,
                paths: Arc::clone(&paths),
                cursor: Arc::clone(&cursor),
                provider: Arc::clone(&self.provider),
                tx: tx.clone(),
                group: group.clone(),
            };
            let first_error = Arc::clone(&first_error);
            let group = group.clone();

            workers.spawn(async move {
                if let Err(e) = worker.run().await {
                    record_first(&first_error, e);
                    group.cancel();
                }
            });
        }
        // Workers own the remaining senders; the stream closes when the last exits.
        drop(tx);

        tokio::spawn(async move {
            while let Some(joined) = workers.join_next().await {
                if let Err(e) = joined {
                    record_first(&first_error, IngestError::WorkerFailed(e.to_string()));
                    group.cancel();
                }
            }

            let outcome = first_error
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take();
            let _ = done_tx.send(outcome.map_or(Ok(()), Err));
        });

        FileStream {
            files: rx,
            done: Completion(done_rx),
        }
    }
}

fn record_first(slot: &Mutex<Option<IngestError>>, err: IngestError) {
    let mut slot = slot.lock().unwrap_or_else(PoisonError::into_inner);
    if slot.is_none() {
        *slot = Some(err);
    }
}

struct Worker<P> {
    id: usize,
    paths: Arc<Vec<PathBuf>>,
    cursor: Arc<AtomicUsize>,
    provider: Arc<P>,
    tx: mpsc::Sender<FileRecord>,
    group: CancellationToken,
}

impl<P: ContentProvider> Worker<P> {
    async fn run(self) -> IngestResult<()> {
        loop {
            // Checked before claiming work so no disk read starts after cancellation.
            if self.group.is_cancelled() {
                return Err(IngestError::Cancelled);
            }

            let index = self.cursor.fetch_add(1, Ordering::Relaxed);
            let Some(path) = self.paths.get(index) else {
                trace!("Reader {} found no more work", self.id);
                return Ok(());
            };

            let data = tokio::select! {
                biased;
                _ = self.group.cancelled() => return Err(IngestError::Cancelled),
                data = self.provider.read(path) => data?,
            };

            trace!("Reader {} read {} ({} bytes)", self.id, path.display(), data.len());

            // A record losing this race is dropped, never retried.
            let record = FileRecord::new(path.clone(), data);
            tokio::select! {
                biased;
                _ = self.group.cancelled() => return Err(IngestError::Cancelled),
                sent = self.tx.send(record) => {
                    if sent.is_err() {
                        return Err(IngestError::Cancelled);
                    }
                }
            }
        }
    }
}
