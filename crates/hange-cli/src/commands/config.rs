//! Configuration commands.

use super::App;
use anyhow::{Context, Result};
use colored::Colorize;

pub fn show(app: &App) -> Result<()> {
    let paths = &app.paths;

    println!("{}", "Current Configuration".cyan().bold());
    println!("{}", "─".repeat(50));

    if !paths.config_file.exists() {
        println!(
            "{} No config file at {}, showing defaults.",
            "Note:".yellow(),
            paths.config_file.display()
        );
    }

    println!("{}", render_fields(&app.config)?);

    Ok(())
}

pub fn path(app: &App) -> Result<()> {
    println!("{}", app.paths.config_file.display());
    Ok(())
}

pub fn get(app: &App, key: &str) -> Result<()> {
    let value = app.config.get_field(key)?;
    println!("{}", value);
    Ok(())
}

pub fn set(mut app: App, key: &str, value: &str) -> Result<()> {
    app.config.set_field(key, value)?;
    app.config
        .save_to(&app.paths.config_file)
        .context("Failed to save config")?;

    let shown = if key == "auth.token" { "<set>" } else { value };
    println!("{} Set {} = {}", "✓".green(), key.cyan(), shown);

    Ok(())
}

/// Every setting as `key = value`. The token is only reported as set or not.
fn render_fields(config: &hange_config::Config) -> Result<String> {
    let mut fields = Vec::new();
    for key in KEYS {
        fields.push(format!("{} = {}", key, config.get_field(key)?));
    }
    Ok(fields.join("\n"))
}

const KEYS: &[&str] = &[
    "openai.base_url",
    "openai.explain_model",
    "openai.commit_model",
    "openai.timeout_seconds",
    "openai.file_expiration_seconds",
    "openai.index_expiration_days",
    "explain.workers",
    "explain.buffer_size",
    "explain.ignore_patterns",
    "explain.cleanup_timeout_seconds",
    "commit.diff_context_lines",
    "commit.max_output_tokens",
    "auth.token",
    "ui.color",
    "ui.spinner",
];
