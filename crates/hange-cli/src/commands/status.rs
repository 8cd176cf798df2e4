//! Status command - show what hange needs and what it found.

use super::App;
use anyhow::Result;
use colored::Colorize;
use hange_config::{ConfigError, TOKEN_ENV_VAR};
use hange_git::Git;

pub fn run(app: &App) -> Result<()> {
    println!("{}", "Hange Status".cyan().bold());
    println!("{}", "─".repeat(50));

    println!();
    println!("{}", "Configuration".white().bold());
    if app.paths.is_initialized() {
        println!(
            "  {} Config: {}",
            "●".green(),
            app.paths.config_file.display()
        );
    } else {
        println!(
            "  {} Config: {} {}",
            "○".yellow(),
            app.paths.config_file.display(),
            "(not created, using defaults)".dimmed()
        );
    }
    println!("  {} API: {}", "•".dimmed(), app.config.openai.base_url);
    println!(
        "  {} Models: explain {}, commit {}",
        "•".dimmed(),
        app.config.openai.explain_model,
        app.config.openai.commit_model
    );

    println!();
    println!("{}", "Authentication".white().bold());
    match app.config.token() {
        Ok(_) if std::env::var(TOKEN_ENV_VAR).is_ok_and(|t| !t.trim().is_empty()) => {
            println!("  {} Token set via {}", "●".green(), TOKEN_ENV_VAR);
        }
        Ok(_) => println!("  {} Token stored in config", "●".green()),
        Err(ConfigError::TokenNotSet) => {
            println!("  {} Token not set", "✗".red());
        }
        Err(e) => println!("  {} {}", "✗".red(), e),
    }

    println!();
    println!("{}", "Tools".white().bold());
    if Git::is_available() {
        println!("  {} git", "●".green());
    } else {
        println!("  {} git {}", "✗".red(), "(required for commit commands)".dimmed());
    }

    if app.config.token().is_err() {
        println!();
        println!(
            "{}",
            "Store a token with 'hange auth' to use explain and commit commands.".dimmed()
        );
    }

    Ok(())
}
