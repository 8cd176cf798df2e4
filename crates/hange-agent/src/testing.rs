//! In-memory remote service for orchestration tests.

use crate::error::AgentResult;
use crate::service::{Prompt, RemoteService};
use async_trait::async_trait;
use hange_core::{FileCounts, IndexHandle, IndexStatus, UploadedResource};
use hange_openai::OpenAiError;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub(crate) struct FakeService {
    reply: String,
    index_status: IndexStatus,
    pending_index_polls: u32,
    pending_file_polls: u32,
    failed_files: u64,
    failing_upload: Option<String>,
    upload_delay: Duration,
    failing_deletes: bool,
    calls: Mutex<Vec<String>>,
    prompts: Mutex<Vec<Prompt>>,
    next_id: AtomicU32,
    attached: AtomicU64,
    index_gets: AtomicU32,
    file_gets: AtomicU32,
}

impl FakeService {
    pub const DEFAULT_REPLY: &'static str = "explanation";

    pub fn new() -> Self {
        Self {
            reply: Self::DEFAULT_REPLY.to_string(),
            index_status: IndexStatus::Completed,
            pending_index_polls: 1,
            pending_file_polls: 1,
            failed_files: 0,
            failing_upload: None,
            upload_delay: Duration::ZERO,
            failing_deletes: false,
            calls: Mutex::new(Vec::new()),
            prompts: Mutex::new(Vec::new()),
            next_id: AtomicU32::new(1),
            attached: AtomicU64::new(0),
            index_gets: AtomicU32::new(0),
            file_gets: AtomicU32::new(0),
        }
    }

    pub fn with_reply(mut self, reply: &str) -> Self {
        self.reply = reply.to_string();
        self
    }

    pub fn with_index_status(mut self, status: IndexStatus) -> Self {
        self.index_status = status;
        self
    }

    pub fn with_pending_index_polls(mut self, polls: u32) -> Self {
        self.pending_index_polls = polls;
        self
    }

    pub fn with_pending_file_polls(mut self, polls: u32) -> Self {
        self.pending_file_polls = polls;
        self
    }

    pub fn with_failed_files(mut self, failed: u64) -> Self {
        self.failed_files = failed;
        self
    }

    pub fn with_failing_upload(mut self, filename: &str) -> Self {
        self.failing_upload = Some(filename.to_string());
        self
    }

    /// Accept uploads at once but reply only after `delay`.
    pub fn with_upload_delay(mut self, delay: Duration) -> Self {
        self.upload_delay = delay;
        self
    }

    pub fn with_failing_deletes(mut self) -> Self {
        self.failing_deletes = true;
        self
    }

    /// Number of recorded calls starting with `prefix`.
    pub fn count(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    pub fn last_prompt(&self) -> Option<Prompt> {
        self.prompts.lock().unwrap().last().cloned()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn failure(message: &str) -> OpenAiError {
        OpenAiError::ApiError {
            status: 500,
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl RemoteService for FakeService {
    async fn upload_file(&self, _data: Vec<u8>, filename: &str) -> AgentResult<UploadedResource> {
        self.record(format!("upload:{filename}"));
        if self.failing_upload.as_deref() == Some(filename) {
            return Err(Self::failure("upload rejected").into());
        }
        if !self.upload_delay.is_zero() {
            tokio::time::sleep(self.upload_delay).await;
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        Ok(UploadedResource::new(format!("file-{id}"), filename))
    }

    async fn create_index(&self) -> AgentResult<IndexHandle> {
        self.record("create_index".to_string());
        Ok(IndexHandle::new("vs_1"))
    }

    async fn get_index(&self, id: &str) -> AgentResult<IndexHandle> {
        self.record(format!("get_index:{id}"));

        let attached = self.attached.load(Ordering::SeqCst);
        if attached == 0 {
            let n = self.index_gets.fetch_add(1, Ordering::SeqCst);
            let status = if n < self.pending_index_polls {
                IndexStatus::InProgress
            } else {
                self.index_status
            };
            return Ok(IndexHandle::new(id).with_status(status));
        }

        let n = self.file_gets.fetch_add(1, Ordering::SeqCst);
        let counts = if n < self.pending_file_polls {
            FileCounts {
                total: attached,
                in_progress: attached,
                ..Default::default()
            }
        } else {
            FileCounts {
                total: attached,
                in_progress: 0,
                completed: attached - self.failed_files,
                failed: self.failed_files,
                cancelled: 0,
            }
        };

        Ok(IndexHandle::new(id)
            .with_status(IndexStatus::Completed)
            .with_file_counts(counts))
    }

    async fn attach_files(&self, index_id: &str, file_ids: Vec<String>) -> AgentResult<()> {
        self.record(format!("attach:{}:{}", file_ids.len(), index_id));
        self.attached.store(file_ids.len() as u64, Ordering::SeqCst);
        Ok(())
    }

    async fn query(&self, prompt: &Prompt, index_id: &str) -> AgentResult<String> {
        self.record(format!("query:{index_id}"));
        self.prompts.lock().unwrap().push(prompt.clone());
        Ok(self.reply.clone())
    }

    async fn generate(&self, prompt: &Prompt) -> AgentResult<String> {
        self.record("generate".to_string());
        self.prompts.lock().unwrap().push(prompt.clone());
        Ok(self.reply.clone())
    }

    async fn delete_file(&self, id: &str) -> AgentResult<()> {
        self.record(format!("delete_file:{id}"));
        if self.failing_deletes {
            return Err(Self::failure("delete rejected").into());
        }
        Ok(())
    }

    async fn delete_index(&self, id: &str) -> AgentResult<()> {
        self.record(format!("delete_index:{id}"));
        if self.failing_deletes {
            return Err(Self::failure("delete rejected").into());
        }
        Ok(())
    }
}
