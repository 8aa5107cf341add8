//! Stockdesk CLI application.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;
use stockdesk_config::load_config_or_default;
use stockdesk_core::types::Side;
use stockdesk_monitor::{setup_logging, LogFormat};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::ValidateConfig = cli.command {
        return cli::commands::validate::run(&cli.config).await;
    }

    let config = load_config_or_default(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;

    // Setup logging
    let level = cli
        .log_level
        .map(|l| l.as_str())
        .unwrap_or(config.logging.level.as_str());
    let format = if cli.json_logs {
        LogFormat::Json
    } else {
        config.logging.format.parse().unwrap_or_default()
    };
    let _log_guard = setup_logging(level, format, config.logging.file.as_deref().map(Path::new));

    // Execute command
    match cli.command {
        Commands::Quotes(args) => cli::commands::quotes::run(args, &config).await,
        Commands::OpenAccount(args) => cli::commands::account::run(args, &config).await,
        Commands::Portfolio(args) => cli::commands::portfolio::run(args, &config).await,
        Commands::Buy(args) => cli::commands::trade::run(Side::Buy, args, &config).await,
        Commands::Sell(args) => cli::commands::trade::run(Side::Sell, args, &config).await,
        Commands::ValidateConfig => cli::commands::validate::run(&cli.config).await,
    }
}
