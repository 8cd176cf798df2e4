//! Thin async wrapper over the `git` command line.

use crate::error::{GitError, GitResult};
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use tokio::process::Command;
use tracing::debug;

const GIT: &str = "git";

/// Runs git commands in one working directory.
///
/// Every child process is killed when its future is dropped, so callers can
/// abandon a command by racing it against cancellation.
#[derive(Debug, Clone, Default)]
pub struct Git {
    dir: Option<PathBuf>,
}

impl Git {
    /// Git in the current working directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Git in `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    /// Whether a git executable is on the `PATH`.
    pub fn is_available() -> bool {
        which::which(GIT).is_ok()
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Staged and unstaged changes, one file per line.
    pub async fn status(&self) -> GitResult<String> {
        self.output(&["--no-pager", "status", "--porcelain"]).await
    }

    /// Per-file summary of staged changes only.
    pub async fn staged_status(&self) -> GitResult<String> {
        self.output(&["--no-pager", "diff", "--staged", "--no-color", "--stat"])
            .await
    }

    /// Patch of the staged changes with `context_lines` unchanged lines
    /// around each hunk.
    pub async fn staged_diff(&self, context_lines: u32) -> GitResult<String> {
        let unified = format!("--unified={}", context_lines);
        self.output(&[
            "--no-pager",
            "diff",
            "--staged",
            "--no-color",
            "--no-ext-diff",
            "--patch",
            &unified,
        ])
        .await
    }

    /// Commit the staged changes with `message`.
    pub async fn commit(&self, message: &str) -> GitResult<()> {
        let args = ["--no-pager", "commit", "-m", message];
        let output = self.run(&args).await?;

        if !output.status.success() {
            // Hooks and git itself may write to either stream.
            let mut combined = String::from_utf8_lossy(&output.stdout).to_string();
            combined.push_str(&String::from_utf8_lossy(&output.stderr));
            return Err(failure(&args, &output, combined));
        }

        Ok(())
    }

    async fn output(&self, args: &[&str]) -> GitResult<String> {
        let output = self.run(args).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            return Err(failure(args, &output, stderr));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    async fn run(&self, args: &[&str]) -> GitResult<Output> {
        if !Self::is_available() {
            return Err(GitError::ToolNotFound {
                tool: GIT.to_string(),
            });
        }

        let mut command = Command::new(GIT);
        command
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        if let Some(dir) = &self.dir {
            command.current_dir(dir);
        }

        debug!("Executing command: {} {}", GIT, args.join(" "));

        Ok(command.output().await?)
    }
}

fn failure(args: &[&str], output: &Output, text: String) -> GitError {
    let command = format!("{} {}", GIT, args.join(" "));
    match output.status.code() {
        Some(code) => GitError::CommandFailed {
            command,
            code,
            output: text.trim_end().to_string(),
        },
        None => GitError::Terminated { command },
    }
}
