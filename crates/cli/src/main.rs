//! Mandi CLI
//!
//! Main entry point for the mandi command-line tool.
//! Answers crop rate, weather and agriculture news queries from local
//! market bulletins.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, ChatCommand, IngestCommand, NewsCommand, WeatherCommand};
use mandi_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// Mandi - market rates, weather and agriculture news
#[derive(Parser, Debug)]
#[command(name = "mandi")]
#[command(about = "Market rates, weather and agriculture news", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "MANDI_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "MANDI_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the market rate workbooks
    #[arg(short, long, global = true, env = "MANDI_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Answer a single query
    Ask(AskCommand),

    /// Interactive conversation on stdin/stdout
    Chat(ChatCommand),

    /// Load the rate workbooks and report what was accepted
    Ingest(IngestCommand),

    /// Show the latest agriculture headlines
    News(NewsCommand),

    /// Show current weather for the configured cities
    Weather(WeatherCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Load base configuration from file and environment
    let config = AppConfig::load_with(cli.workspace, cli.config)?;

    // Apply CLI overrides
    let config = config.with_overrides(cli.data_dir, cli.log_level, cli.verbose, cli.no_color);

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color)?;
    config.validate()?;

    tracing::info!("Mandi CLI starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Data directory: {:?}", config.data_dir());

    let command_name = match &cli.command {
        Commands::Ask(_) => "ask",
        Commands::Chat(_) => "chat",
        Commands::Ingest(_) => "ingest",
        Commands::News(_) => "news",
        Commands::Weather(_) => "weather",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    // Route to command handlers
    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Chat(cmd) => cmd.execute(&config).await,
        Commands::Ingest(cmd) => cmd.execute(&config),
        Commands::News(cmd) => cmd.execute(&config).await,
        Commands::Weather(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
