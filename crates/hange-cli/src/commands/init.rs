//! Initialize hange.

use super::App;
use anyhow::{Context, Result};
use colored::Colorize;
use hange_config::Config;

pub fn run(app: &App) -> Result<()> {
    let paths = &app.paths;

    if paths.is_initialized() {
        println!("{} Hange is already initialized.", "Note:".yellow().bold());
        println!("  Config: {}", paths.config_file.display());
        return Ok(());
    }

    println!("{}", "Initializing hange...".cyan().bold());

    paths
        .ensure_dirs()
        .context("Failed to create directories")?;
    println!("  {} Created directories", "✓".green());

    Config::create_default_file(&paths.config_file).context("Failed to create config file")?;
    println!(
        "  {} Created config: {}",
        "✓".green(),
        paths.config_file.display()
    );

    println!();
    println!("{}", "Hange initialized successfully!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Store your API token: {}", "hange auth < token-file".cyan());
    println!("  2. Explain a project: {}", "hange explain ./src".cyan());
    println!("  3. Write a commit message: {}", "hange commit-msg".cyan());

    Ok(())
}
