//! The remote service seam and its OpenAI implementation.

use crate::error::AgentResult;
use async_trait::async_trait;
use hange_core::{FileCounts, IndexHandle, IndexStatus, UploadedResource};
use hange_openai::{OpenAiClient, ResponseRequest, VectorStore, VectorStoreStatus};
use tracing::debug;

/// A single generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub model: String,
    pub instructions: String,
    pub input: String,
    pub max_output_tokens: Option<u32>,
}

impl Prompt {
    pub fn new(
        model: impl Into<String>,
        instructions: impl Into<String>,
        input: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            instructions: instructions.into(),
            input: input.into(),
            max_output_tokens: None,
        }
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = Some(max_output_tokens);
        self
    }

    fn to_request(&self) -> ResponseRequest {
        let mut request = ResponseRequest::new(&self.model, &self.input)
            .with_instructions(&self.instructions);
        if let Some(limit) = self.max_output_tokens {
            request = request.with_max_output_tokens(limit);
        }
        request
    }
}

/// Operations the orchestrator needs from the hosted service.
#[async_trait]
pub trait RemoteService: Send + Sync + 'static {
    /// Store file content remotely.
    async fn upload_file(&self, data: Vec<u8>, filename: &str) -> AgentResult<UploadedResource>;

    /// Create an empty searchable index.
    async fn create_index(&self) -> AgentResult<IndexHandle>;

    /// Fetch the current state of an index.
    async fn get_index(&self, id: &str) -> AgentResult<IndexHandle>;

    /// Add uploaded files to an index in one batch.
    async fn attach_files(&self, index_id: &str, file_ids: Vec<String>) -> AgentResult<()>;

    /// Ask the model with file search over an index.
    async fn query(&self, prompt: &Prompt, index_id: &str) -> AgentResult<String>;

    /// Ask the model without any index.
    async fn generate(&self, prompt: &Prompt) -> AgentResult<String>;

    async fn delete_file(&self, id: &str) -> AgentResult<()>;

    async fn delete_index(&self, id: &str) -> AgentResult<()>;
}

#[async_trait]
impl RemoteService for OpenAiClient {
    async fn upload_file(&self, data: Vec<u8>, filename: &str) -> AgentResult<UploadedResource> {
        let file = OpenAiClient::upload_file(self, data, filename).await?;
        Ok(UploadedResource::new(file.id, file.filename))
    }

    async fn create_index(&self) -> AgentResult<IndexHandle> {
        let name = format!("hange_{}", chrono::Utc::now().timestamp());
        let store = self.create_vector_store(&name).await?;
        Ok(index_handle(store))
    }

    async fn get_index(&self, id: &str) -> AgentResult<IndexHandle> {
        let store = self.get_vector_store(id).await?;
        Ok(index_handle(store))
    }

    async fn attach_files(&self, index_id: &str, file_ids: Vec<String>) -> AgentResult<()> {
        let batch = self.create_file_batch(index_id, file_ids).await?;
        debug!("File batch {} started ({})", batch.id, batch.status);
        Ok(())
    }

    async fn query(&self, prompt: &Prompt, index_id: &str) -> AgentResult<String> {
        let request = prompt.to_request().with_file_search(index_id);
        let response = self.create_response(&request).await?;
        Ok(response.output_text())
    }

    async fn generate(&self, prompt: &Prompt) -> AgentResult<String> {
        let response = self.create_response(&prompt.to_request()).await?;
        Ok(response.output_text())
    }

    async fn delete_file(&self, id: &str) -> AgentResult<()> {
        OpenAiClient::delete_file(self, id).await?;
        Ok(())
    }

    async fn delete_index(&self, id: &str) -> AgentResult<()> {
        self.delete_vector_store(id).await?;
        Ok(())
    }
}

fn index_handle(store: VectorStore) -> IndexHandle {
    // An expired store can never become searchable again.
    let status = match store.status {
        VectorStoreStatus::InProgress => IndexStatus::InProgress,
        VectorStoreStatus::Completed => IndexStatus::Completed,
        VectorStoreStatus::Expired | VectorStoreStatus::Unknown => IndexStatus::Failed,
    };

    let counts = store.file_counts;
    IndexHandle::new(store.id)
        .with_status(status)
        .with_file_counts(FileCounts {
            total: counts.total,
            in_progress: counts.in_progress,
            completed: counts.completed,
            failed: counts.failed,
            cancelled: counts.cancelled,
        })
}
