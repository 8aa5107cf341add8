//! CLI definitions.

pub mod commands;
pub mod session;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use stockdesk_core::types::Role;

#[derive(Parser)]
#[command(name = "stockdesk")]
#[command(author, version, about = "Simulated stock trading desk")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", env = "STOCKDESK_CONFIG")]
    pub config: PathBuf,

    /// Log level (overrides the configured level)
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum RoleArg {
    Trader,
    Viewer,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Trader => Role::Trader,
            RoleArg::Viewer => Role::Viewer,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch quotes with trend predictions
    Quotes(QuotesArgs),
    /// Create an account and its portfolio
    OpenAccount(OpenAccountArgs),
    /// Show an account's portfolio
    Portfolio(PortfolioArgs),
    /// Buy shares at the current quote
    Buy(TradeArgs),
    /// Sell shares
    Sell(TradeArgs),
    /// Validate configuration and print the effective settings
    ValidateConfig,
}

#[derive(clap::Args)]
pub struct QuotesArgs {
    /// Symbols to fetch (comma-separated)
    #[arg(short = 'S', long, value_delimiter = ',', required = true)]
    pub symbols: Vec<String>,

    /// Override the per-symbol timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

#[derive(clap::Args)]
pub struct OpenAccountArgs {
    /// Login name, unique
    #[arg(short, long)]
    pub username: String,

    /// Display name (defaults to the username)
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub email: String,

    #[arg(long, value_enum, default_value = "trader")]
    pub role: RoleArg,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

#[derive(clap::Args)]
pub struct PortfolioArgs {
    /// Account username
    #[arg(short, long)]
    pub user: String,

    /// Number of recent transactions to show
    #[arg(short, long, default_value = "10")]
    pub transactions: usize,

    /// Value holdings at their average price instead of fetching quotes
    #[arg(long)]
    pub offline: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

#[derive(clap::Args)]
pub struct TradeArgs {
    /// Account username
    #[arg(short, long)]
    pub user: String,

    /// Symbol to trade
    pub symbol: String,

    /// Number of shares
    pub quantity: i64,

    /// Only check whether the trade could proceed
    #[arg(long)]
    pub dry_run: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}
