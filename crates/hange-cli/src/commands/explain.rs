//! Explain command - describe files and directories with the hosted model.

use super::{block_on_cancellable, App};
use anyhow::{Context, Result};
use hange_agent::{Explainer, ExplainerConfig};
use hange_ingest::{IngestionPipeline, PathResolver, ReaderConfig};
use std::path::PathBuf;
use std::time::Duration;

pub fn run(app: &App, args: &[String]) -> Result<()> {
    let paths = validate_args(args)?;

    let settings = &app.config.explain;
    let resolver = PathResolver::new(settings.ignore_patterns.as_slice())?;
    let pipeline = IngestionPipeline::from_fs(resolver);
    let reader_config = ReaderConfig::with_overrides(settings.workers, settings.buffer_size);

    let explainer_config = ExplainerConfig::new(&app.config.openai.explain_model)
        .with_cleanup_timeout(cleanup_timeout(settings.cleanup_timeout_seconds));
    let explainer = Explainer::new(app.client()?, explainer_config);

    let explanation = block_on_cancellable(|token| async move {
        let (files, done) = pipeline
            .read(&token, &paths, reader_config)?
            .into_parts();

        let spinner = app.spinner("Explaining files...")?;

        // Cancelled when either side fails, so the other stops early.
        let run = token.child_token();
        let reading = async {
            let result = done.wait().await;
            if result.is_err() {
                run.cancel();
            }
            result
        };
        let explaining = async {
            let result = explainer.explain(&run, files).await;
            run.cancel();
            result
        };

        let (read, explained) = tokio::join!(reading, explaining);
        spinner.finish_and_clear();

        // A reader stopped by the explainer reports cancellation; only a
        // genuine read failure takes precedence.
        match read {
            Err(e) if !e.is_cancelled() => Err(e).context("Failed to read files"),
            _ => explained.context("Failed to explain files"),
        }
    })?;

    println!("{}", explanation);

    Ok(())
}

fn validate_args(args: &[String]) -> Result<Vec<PathBuf>> {
    if args.is_empty() {
        anyhow::bail!("no arguments provided");
    }

    if args.iter().any(|arg| arg.is_empty()) {
        anyhow::bail!("empty argument");
    }

    Ok(args.iter().map(PathBuf::from).collect())
}

fn cleanup_timeout(seconds: u64) -> Option<Duration> {
    (seconds > 0).then(|| Duration::from_secs(seconds))
}
