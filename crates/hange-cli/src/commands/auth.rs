//! Store the API token.

use super::App;
use anyhow::{Context, Result};
use colored::Colorize;
use std::io::{self, BufRead, IsTerminal};

pub fn run(mut app: App, token: Option<String>) -> Result<()> {
    let token = match token {
        Some(token) => token,
        None => read_token_from_stdin()?,
    };

    app.config
        .set_token(&token)
        .context("Failed to parse token argument")?;
    app.config
        .save_to(&app.paths.config_file)
        .context("Failed to save config")?;

    println!(
        "{} Token saved to {}",
        "✓".green(),
        app.paths.config_file.display()
    );

    Ok(())
}

fn read_token_from_stdin() -> Result<String> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        anyhow::bail!("No token provided; pass it as an argument or via stdin");
    }

    read_first_line(stdin.lock())
}

/// First line of `reader`, without the line ending.
fn read_first_line(mut reader: impl BufRead) -> Result<String> {
    let mut line = String::new();
    reader
        .read_line(&mut line)
        .context("Failed to read token from stdin")?;

    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
