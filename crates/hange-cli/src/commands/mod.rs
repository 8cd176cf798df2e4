//! CLI command implementations.

pub mod auth;
pub mod commit;
pub mod config;
pub mod explain;
pub mod init;
pub mod status;

use anyhow::{Context, Result};
use hange_agent::AgentError;
use hange_config::{AppPaths, Config};
use hange_ingest::IngestError;
use hange_openai::OpenAiClient;
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Paths and configuration shared by every command.
pub struct App {
    pub paths: AppPaths,
    pub config: Config,
}

impl App {
    /// Locate and load the configuration. A missing file yields defaults.
    pub fn load(config_file: Option<PathBuf>) -> Result<Self> {
        let paths = AppPaths::with_config_file(config_file)
            .context("Failed to determine application directories")?;
        let config = Config::load_from(&paths.config_file).with_context(|| {
            format!("Failed to load config from {}", paths.config_file.display())
        })?;

        if !config.ui.color {
            colored::control::set_override(false);
        }

        Ok(Self { paths, config })
    }

    /// Authenticated client for the hosted LLM service.
    pub fn client(&self) -> Result<Arc<OpenAiClient>> {
        let token = self.config.token()?;
        let client = OpenAiClient::from_config(&self.config.openai, &token)
            .context("Failed to create API client")?;
        Ok(Arc::new(client))
    }

    /// Spinner on stderr, hidden when disabled in the config.
    pub fn spinner(&self, message: &str) -> Result<ProgressBar> {
        if !self.config.ui.spinner {
            return Ok(ProgressBar::hidden());
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        Ok(pb)
    }
}

/// Run `task` on a fresh runtime with a token cancelled by Ctrl-C or SIGTERM.
pub fn block_on_cancellable<T, F, Fut>(task: F) -> Result<T>
where
    F: FnOnce(CancellationToken) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let rt = Runtime::new().context("Failed to create async runtime")?;

    rt.block_on(async {
        let token = CancellationToken::new();
        let signals = tokio::spawn(cancel_on_signal(token.clone()));

        let result = task(token).await;

        signals.abort();
        result
    })
}

async fn cancel_on_signal(token: CancellationToken) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = terminate.recv() => {}
                }
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                if tokio::signal::ctrl_c().await.is_err() {
                    return;
                }
            }
        }
    }

    #[cfg(not(unix))]
    {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
    }

    debug!("Interrupt received, cancelling");
    token.cancel();
}

/// Whether `err` stems from cooperative cancellation anywhere in its chain.
pub fn is_cancelled(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<AgentError>()
            .is_some_and(AgentError::is_cancelled)
            || cause
                .downcast_ref::<IngestError>()
                .is_some_and(IngestError::is_cancelled)
    })
}
