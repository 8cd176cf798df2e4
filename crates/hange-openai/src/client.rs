//! HTTP client for the hosted LLM service.

use crate::error::{OpenAiError, OpenAiResult};
use crate::types::*;
use hange_config::OpenAiConfig;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Client for the files, vector store and responses APIs.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    timeout: Duration,
    file_expiration_seconds: u64,
    index_expiration_days: u64,
}

impl OpenAiClient {
    /// Create a new client from configuration.
    pub fn from_config(config: &OpenAiConfig, api_key: &str) -> OpenAiResult<Self> {
        let timeout = Duration::from_secs(config.timeout_seconds);

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key.trim()))
            .map_err(|_| OpenAiError::InvalidConfig("API key contains invalid characters".to_string()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert("OpenAI-Beta", HeaderValue::from_static("assistants=v2"));

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(OpenAiError::Http)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout,
            file_expiration_seconds: config.file_expiration_seconds,
            index_expiration_days: config.index_expiration_days,
        })
    }

    /// Upload file content for later use by file search.
    ///
    /// The file expires on the server on its own, so nothing is left behind
    /// if the caller never deletes it.
    pub async fn upload_file(&self, data: Vec<u8>, filename: &str) -> OpenAiResult<FileObject> {
        let url = format!("{}/files", self.base_url);
        debug!("Uploading {} ({} bytes)", filename, data.len());

        let part = Part::bytes(data)
            .file_name(filename.to_string())
            .mime_str("text/plain")?;

        let form = Form::new()
            .text("purpose", "user_data")
            .text("expires_after[anchor]", "created_at")
            .text("expires_after[seconds]", self.file_expiration_seconds.to_string())
            .part("file", part);

        let file: FileObject = self.send(self.client.post(&url).multipart(form)).await?;
        debug!("File created: {} ({})", file.id, file.filename);

        Ok(file)
    }

    /// Delete an uploaded file.
    pub async fn delete_file(&self, id: &str) -> OpenAiResult<DeletionStatus> {
        let url = format!("{}/files/{}", self.base_url, id);
        self.send(self.client.delete(&url)).await
    }

    /// Create an empty vector store.
    pub async fn create_vector_store(&self, name: &str) -> OpenAiResult<VectorStore> {
        let url = format!("{}/vector_stores", self.base_url);

        let request = CreateVectorStoreRequest {
            name: name.to_string(),
            expires_after: (self.index_expiration_days > 0).then(|| ExpiresAfter {
                anchor: "last_active_at".to_string(),
                days: self.index_expiration_days,
            }),
        };

        let store: VectorStore = self.send(self.client.post(&url).json(&request)).await?;
        debug!("Vector store created: {} ({:?})", store.id, store.status);

        Ok(store)
    }

    /// Fetch the current state of a vector store.
    pub async fn get_vector_store(&self, id: &str) -> OpenAiResult<VectorStore> {
        let url = format!("{}/vector_stores/{}", self.base_url, id);
        self.send(self.client.get(&url)).await
    }

    /// Delete a vector store.
    pub async fn delete_vector_store(&self, id: &str) -> OpenAiResult<DeletionStatus> {
        let url = format!("{}/vector_stores/{}", self.base_url, id);
        self.send(self.client.delete(&url)).await
    }

    /// Attach uploaded files to a vector store in one batch.
    pub async fn create_file_batch(
        &self,
        vector_store_id: &str,
        file_ids: Vec<String>,
    ) -> OpenAiResult<FileBatch> {
        let url = format!("{}/vector_stores/{}/file_batches", self.base_url, vector_store_id);
        let request = FileBatchRequest { file_ids };

        self.send(self.client.post(&url).json(&request)).await
    }

    /// Generate a response (non-streaming).
    pub async fn create_response(&self, request: &ResponseRequest) -> OpenAiResult<Response> {
        let url = format!("{}/responses", self.base_url);
        debug!("Generating with model {}", request.model);

        self.send(self.client.post(&url).json(request)).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> OpenAiResult<T> {
        let response = request.send().await.map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .map(|body| body.error.message)
                .unwrap_or(text);

            if status == StatusCode::UNAUTHORIZED {
                return Err(OpenAiError::Unauthorized { message });
            }

            return Err(OpenAiError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn map_send_error(&self, e: reqwest::Error) -> OpenAiError {
        if e.is_connect() {
            OpenAiError::ServerUnreachable {
                base_url: self.base_url.clone(),
            }
        } else if e.is_timeout() {
            OpenAiError::Timeout {
                seconds: self.timeout.as_secs(),
            }
        } else {
            OpenAiError::Http(e)
        }
    }
}
