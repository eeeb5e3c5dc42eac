//! Newsdesk CLI
//!
//! Main entry point for the newsdesk command-line tool.
//! Answers questions about a news archive from the articles in its search index.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, PingCommand};
use newsdesk_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// Newsdesk - question answering over a news archive
#[derive(Parser, Debug)]
#[command(name = "newsdesk")]
#[command(about = "Ask questions about the news, answered from the archive", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "NEWSDESK_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "NEWSDESK_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// LLM provider (openai, ollama)
    #[arg(short, long, global = true, env = "NEWSDESK_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "NEWSDESK_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask a question about the news
    Ask(AskCommand),

    /// Check the connection to the search backend
    Ping(PingCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Secrets usually live in .env next to the workspace
    dotenvy::dotenv().ok();

    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Load base configuration from file and environment
    let config = AppConfig::load_from(cli.workspace.clone(), cli.config.clone())?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.workspace,
        cli.config,
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("Newsdesk CLI starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Provider: {}", config.llm.provider);
    tracing::debug!("Model: {}", config.llm.model);

    let command_name = match &cli.command {
        Commands::Ask(_) => "ask",
        Commands::Ping(_) => "ping",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    // Route to command handlers
    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Ping(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
