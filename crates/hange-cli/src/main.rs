//! Hange CLI - A reliable soldier for routine developer tasks.

mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::App;
use hange_config::CONFIG_ENV_VAR;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Hange - explains code and writes commit messages
#[derive(Parser)]
#[command(name = "hange")]
#[command(author = "Yaroslav Koval")]
#[command(version)]
#[command(about = "A reliable CLI soldier for routine developer tasks", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: platform config directory)
    #[arg(long, global = true, env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the default config file
    Init,

    /// Store the API token (argument or first line of stdin)
    #[command(after_help = "Examples:\n  hange auth < token-file\n  echo \"$TOKEN\" | hange auth\n  hange auth \"token-value\"")]
    Auth {
        /// The token. Read from stdin when omitted.
        token: Option<String>,
    },

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Explain files or directories from a developer's perspective
    Explain {
        /// Files and directories to explain
        paths: Vec<String>,
    },

    /// Generate a commit message for the staged changes
    CommitMsg {
        /// Context of the change, like a task description
        context: Option<String>,
    },

    /// Generate a commit message and commit the staged changes
    Commit {
        /// Context of the change, like a task description
        context: Option<String>,
    },

    /// Show environment and configuration status
    Status,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Print the config file location
    Path,

    /// Print a configuration value
    Get {
        /// Configuration key (e.g., openai.explain_model)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., openai.explain_model)
        key: String,

        /// Value to set
        value: String,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hange=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hange=info,warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn run(app: App, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Init => commands::init::run(&app),
        Commands::Auth { token } => commands::auth::run(app, token),
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show => commands::config::show(&app),
            ConfigCommands::Path => commands::config::path(&app),
            ConfigCommands::Get { key } => commands::config::get(&app, &key),
            ConfigCommands::Set { key, value } => commands::config::set(app, &key, &value),
        },
        Commands::Explain { paths } => commands::explain::run(&app, &paths),
        Commands::CommitMsg { context } => commands::commit::message(&app, context),
        Commands::Commit { context } => commands::commit::commit(&app, context),
        Commands::Status => commands::status::run(&app),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = App::load(cli.config).and_then(|app| run(app, cli.command));

    if let Err(e) = result {
        if commands::is_cancelled(&e) {
            info!("Terminated");
            return;
        }

        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
