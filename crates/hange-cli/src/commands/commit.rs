//! Commit commands - generate a message for staged changes, optionally commit.

use super::{block_on_cancellable, App};
use anyhow::{Context, Result};
use colored::Colorize;
use hange_agent::{AgentError, CommitWriter, CommitWriterConfig};
use hange_core::CommitContext;
use hange_git::Git;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Print a commit message for the staged changes.
pub fn message(app: &App, context: Option<String>) -> Result<()> {
    let git = Git::new();

    let message = block_on_cancellable(|token| async move {
        generate(app, &git, &token, context).await
    })?;

    println!("{}", message);
    Ok(())
}

/// Generate a commit message and commit the staged changes with it.
pub fn commit(app: &App, context: Option<String>) -> Result<()> {
    let git = Git::new();

    let message = block_on_cancellable(|token| async move {
        let message = generate(app, &git, &token, context).await?;
        cancellable(&token, git.commit(&message))
            .await?
            .context("Failed to commit")?;
        Ok(message)
    })?;

    println!("{} Committed: {}", "✓".green(), message);
    Ok(())
}

async fn generate(
    app: &App,
    git: &Git,
    token: &CancellationToken,
    user_input: Option<String>,
) -> Result<String> {
    let context = collect_context(app, git, token, user_input).await?;

    let settings = &app.config;
    let writer = CommitWriter::new(
        app.client()?,
        CommitWriterConfig::new(&settings.openai.commit_model, settings.commit.max_output_tokens),
    );

    let spinner = app.spinner("Writing commit message...")?;
    let message = writer.generate(token, context).await;
    spinner.finish_and_clear();

    message.context("Failed to generate commit message")
}

async fn collect_context(
    app: &App,
    git: &Git,
    token: &CancellationToken,
    user_input: Option<String>,
) -> Result<CommitContext> {
    let status = cancellable(token, git.status())
        .await?
        .context("Failed to read git status")?;
    let staged_status = cancellable(token, git.staged_status())
        .await?
        .context("Failed to read staged status")?;
    let diff = cancellable(token, git.staged_diff(app.config.commit.diff_context_lines))
        .await?
        .context("Failed to read staged diff")?;

    Ok(CommitContext {
        user_input: user_input.unwrap_or_default(),
        status,
        staged_status,
        diff,
    })
}

/// Race `work` against `token`. Dropping the work kills its git process.
async fn cancellable<T>(
    token: &CancellationToken,
    work: impl Future<Output = T>,
) -> Result<T, AgentError> {
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(AgentError::Cancelled),
        value = work => Ok(value),
    }
}
