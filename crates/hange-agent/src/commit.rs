//! Commit message generation.

use crate::error::{AgentError, AgentResult};
use crate::prompts::{commit_input, COMMIT_INSTRUCTIONS};
use crate::service::{Prompt, RemoteService};
use hange_core::CommitContext;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Model settings for commit messages.
#[derive(Debug, Clone)]
pub struct CommitWriterConfig {
    pub model: String,
    pub max_output_tokens: u32,
}

impl CommitWriterConfig {
    pub fn new(model: impl Into<String>, max_output_tokens: u32) -> Self {
        Self {
            model: model.into(),
            max_output_tokens,
        }
    }
}

/// Writes a one-line commit message from repository state.
pub struct CommitWriter<S> {
    service: Arc<S>,
    config: CommitWriterConfig,
}

impl<S: RemoteService> CommitWriter<S> {
    pub fn new(service: Arc<S>, config: CommitWriterConfig) -> Self {
        Self { service, config }
    }

    /// Generate a commit message for the staged changes in `context`.
    pub async fn generate(
        &self,
        token: &CancellationToken,
        context: CommitContext,
    ) -> AgentResult<String> {
        context.validate()?;

        let prompt = Prompt::new(&self.config.model, COMMIT_INSTRUCTIONS, commit_input(&context))
            .with_max_output_tokens(self.config.max_output_tokens);
        debug!("Commit prompt is {} bytes", prompt.input.len());

        info!("Calling commit model...");

        let reply = tokio::select! {
            biased;
            _ = token.cancelled() => return Err(AgentError::Cancelled),
            reply = self.service.generate(&prompt) => reply?,
        };

        single_line(&reply).ok_or(AgentError::EmptyResponse)
    }
}

/// First non-empty line, without surrounding quotes or a trailing period.
fn single_line(reply: &str) -> Option<String> {
    let line = reply.lines().map(str::trim).find(|line| !line.is_empty())?;
    let line = line
        .trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .trim_end_matches('.')
        .trim();

    (!line.is_empty()).then(|| line.to_string())
}
