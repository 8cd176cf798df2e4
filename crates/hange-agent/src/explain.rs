//! Explaining a set of files through a server-side index.
//!
//! A run goes through four phases: upload every file concurrently, create an
//! index and wait for it, attach the uploads and wait until the server has
//! processed each of them, then query the model with file search over the
//! index. Remote resources are recorded in a [`ResourceLedger`] as soon as
//! they exist and are deleted by [`Explainer::cleanup`], which runs after
//! every run whatever its outcome.

use crate::error::{AgentError, AgentResult};
use crate::ledger::ResourceLedger;
use crate::poll::{poll, Probe};
use crate::prompts::{explain_input, EXPLAIN_INSTRUCTIONS};
use crate::service::{Prompt, RemoteService};
use hange_core::{FileRecord, IndexHandle, IndexStatus, ValidationError};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Timing and model settings of an [`Explainer`].
#[derive(Debug, Clone)]
pub struct ExplainerConfig {
    /// Model answering the query.
    pub model: String,
    /// Delay between index status checks.
    pub index_poll_interval: Duration,
    /// Index status checks before giving up.
    pub index_poll_attempts: u32,
    /// Delay between file processing checks. These are never capped.
    pub files_poll_interval: Duration,
    /// Upper bound for cleanup. `None` waits for every deletion.
    pub cleanup_timeout: Option<Duration>,
}

impl ExplainerConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            index_poll_interval: Duration::from_millis(500),
            index_poll_attempts: 5,
            files_poll_interval: Duration::from_secs(1),
            cleanup_timeout: None,
        }
    }

    pub fn with_cleanup_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.cleanup_timeout = timeout;
        self
    }
}

type Uploads = JoinSet<AgentResult<()>>;

/// Uploads files, indexes them and asks the model to explain them.
pub struct Explainer<S> {
    service: Arc<S>,
    config: ExplainerConfig,
    ledger: Arc<ResourceLedger>,
    /// Uploads still running when their phase was abandoned.
    parked: Mutex<Vec<Uploads>>,
}

impl<S: RemoteService> Explainer<S> {
    pub fn new(service: Arc<S>, config: ExplainerConfig) -> Self {
        Self {
            service,
            config,
            ledger: Arc::new(ResourceLedger::new()),
            parked: Mutex::new(Vec::new()),
        }
    }

    /// Resources currently allocated on the server.
    pub fn ledger(&self) -> &ResourceLedger {
        &self.ledger
    }

    /// Explain every file received on `files`.
    ///
    /// Cleanup always runs before returning, including after cancellation.
    pub async fn explain(
        &self,
        token: &CancellationToken,
        files: mpsc::Receiver<FileRecord>,
    ) -> AgentResult<String> {
        let result = self.run(token, files).await;
        self.cleanup().await;
        result
    }

    async fn run(
        &self,
        token: &CancellationToken,
        files: mpsc::Receiver<FileRecord>,
    ) -> AgentResult<String> {
        self.upload_files(token, files).await?;

        let uploaded = self.ledger.upload_count();
        if uploaded == 0 {
            return Err(ValidationError::EmptyInput("no files to explain".to_string()).into());
        }
        info!("Uploaded {} file(s)", uploaded);

        let index = self.create_index(token).await?;
        self.attach_files(token, &index.id, uploaded).await?;
        self.query(token, &index.id).await
    }

    /// Upload each record as it arrives, one task per record.
    ///
    /// The first failed upload fails the phase and keeps siblings that have
    /// not started yet from sending. Uploads already sent are parked so
    /// cleanup can wait for them and delete what they created.
    async fn upload_files(
        &self,
        token: &CancellationToken,
        mut files: mpsc::Receiver<FileRecord>,
    ) -> AgentResult<()> {
        let group = token.child_token();
        let mut uploads = Uploads::new();
        let mut open = true;

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    self.park(uploads);
                    return Err(AgentError::Cancelled);
                }
                Some(joined) = uploads.join_next(), if !uploads.is_empty() => {
                    if let Err(e) = flatten(joined) {
                        group.cancel();
                        self.park(uploads);
                        return Err(e);
                    }
                }
                record = files.recv(), if open => match record {
                    Some(record) => self.spawn_upload(&mut uploads, &group, record),
                    None => open = false,
                },
                else => break,
            }
        }

        Ok(())
    }

    fn spawn_upload(&self, uploads: &mut Uploads, group: &CancellationToken, record: FileRecord) {
        let service = Arc::clone(&self.service);
        let ledger = Arc::clone(&self.ledger);
        let group = group.clone();

        uploads.spawn(async move {
            if group.is_cancelled() {
                return Err(AgentError::Cancelled);
            }

            let filename = record.display_name();
            debug!("Uploading {} ({} bytes)", filename, record.len());

            // A started request runs to completion. Abandoning it could leave
            // a file on the server that is never recorded, so never deleted.
            let uploaded = service.upload_file(record.into_data(), &filename).await?;

            debug!("File {} uploaded as {}", uploaded.filename, uploaded.id);
            ledger.record_upload(uploaded);
            Ok(())
        });
    }

    fn park(&self, uploads: Uploads) {
        if uploads.is_empty() {
            return;
        }
        debug!("{} upload(s) still running, deferring to cleanup", uploads.len());
        self.parked
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(uploads);
    }

    async fn create_index(&self, token: &CancellationToken) -> AgentResult<IndexHandle> {
        if token.is_cancelled() {
            return Err(AgentError::Cancelled);
        }

        // Not raced against the token: an abandoned request could create an
        // index that is never recorded, so never deleted.
        let index = self.service.create_index().await?;
        self.ledger.set_index(index.clone());

        info!("Waiting for index processing...");

        let service = &self.service;
        let id = index.id.as_str();
        let index = poll(
            token,
            || async move {
                let index = service.get_index(id).await?;
                Ok(if index.status.is_terminal() {
                    Probe::Ready(index)
                } else {
                    Probe::Pending
                })
            },
            self.config.index_poll_interval,
            self.config.index_poll_attempts,
        )
        .await?;

        self.ledger.set_index(index.clone());

        if index.status == IndexStatus::Failed {
            return Err(AgentError::IndexFailed { id: index.id });
        }

        info!("Index {} created", index.id);
        Ok(index)
    }

    async fn attach_files(
        &self,
        token: &CancellationToken,
        index_id: &str,
        expected: usize,
    ) -> AgentResult<()> {
        if token.is_cancelled() {
            return Err(AgentError::Cancelled);
        }

        self.service
            .attach_files(index_id, self.ledger.file_ids())
            .await?;

        info!("Started file batch processing...");

        let service = &self.service;
        let expected = expected as u64;
        let index = poll(
            token,
            || async move {
                let index = service.get_index(index_id).await?;
                let counts = index.file_counts;
                debug!(
                    "Files processing status: {} (total {}, in progress {}, failed {})",
                    index.status, counts.total, counts.in_progress, counts.failed
                );

                Ok(if counts.processed() == expected {
                    Probe::Ready(index)
                } else {
                    Probe::Pending
                })
            },
            self.config.files_poll_interval,
            0,
        )
        .await?;

        self.ledger.set_index(index.clone());

        let counts = index.file_counts;
        if counts.failed != 0 {
            return Err(AgentError::FailedToProcessFiles {
                failed: counts.failed,
                total: counts.total,
            });
        }

        info!("File batch is added to the index");
        Ok(())
    }

    async fn query(&self, token: &CancellationToken, index_id: &str) -> AgentResult<String> {
        let prompt = Prompt::new(
            &self.config.model,
            EXPLAIN_INSTRUCTIONS,
            explain_input(&self.ledger.filenames()),
        );

        info!("Calling explanation model...");

        let text = tokio::select! {
            biased;
            _ = token.cancelled() => return Err(AgentError::Cancelled),
            text = self.service.query(&prompt, index_id) => text?,
        };

        if text.trim().is_empty() {
            return Err(AgentError::EmptyResponse);
        }

        Ok(text)
    }

    /// Delete every recorded resource.
    ///
    /// Takes no cancellation token: teardown must not be skipped because the
    /// caller gave up. Parked uploads are awaited first so nothing they
    /// create is missed. Failures are logged and never returned.
    pub async fn cleanup(&self) {
        match self.config.cleanup_timeout {
            Some(limit) => {
                if tokio::time::timeout(limit, self.release_all()).await.is_err() {
                    warn!(
                        "Cleanup did not finish within {}s, remaining resources will expire on the server",
                        limit.as_secs()
                    );
                }
            }
            None => self.release_all().await,
        }

        info!("Data cleanup is finished");
    }

    async fn release_all(&self) {
        let parked = std::mem::take(&mut *self.parked.lock().unwrap_or_else(PoisonError::into_inner));
        for mut uploads in parked {
            while let Some(joined) = uploads.join_next().await {
                if let Err(e) = flatten(joined) {
                    if !e.is_cancelled() {
                        debug!("Deferred upload failed: {}", e);
                    }
                }
            }
        }

        let (uploaded, index) = self.ledger.take();
        let mut deletions = JoinSet::new();

        for resource in uploaded {
            let service = Arc::clone(&self.service);
            deletions.spawn(async move {
                match service.delete_file(&resource.id).await {
                    Ok(()) => debug!("File is deleted by id {}", resource.id),
                    Err(e) => error!("Failed to delete file by id {}: {}", resource.id, e),
                }
            });
        }

        if let Some(index) = index {
            let service = Arc::clone(&self.service);
            deletions.spawn(async move {
                match service.delete_index(&index.id).await {
                    Ok(()) => debug!("Index is deleted by id {}", index.id),
                    Err(e) => error!("Failed to delete index by id {}: {}", index.id, e),
                }
            });
        }

        while let Some(joined) = deletions.join_next().await {
            if let Err(e) = joined {
                error!("Cleanup task failed: {}", e);
            }
        }
    }
}

fn flatten(joined: Result<AgentResult<()>, JoinError>) -> AgentResult<()> {
    joined.map_err(|e| AgentError::TaskFailed(e.to_string()))?
}
