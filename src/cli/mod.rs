//! CLI definitions.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "risk")]
#[command(author, version, about = "Position sizing, trade assessment and protective guards")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "RISK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Dynamic risk parameters (JSON or TOML) applied over the configuration
    #[arg(short, long)]
    pub params: Option<PathBuf>,

    /// Log level (overrides the configuration file)
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    /// Also write logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

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

#[derive(Subcommand)]
pub enum Commands {
    /// Size a new position
    Size(RequestArgs),
    /// Assess a proposed trade
    Assess(RequestArgs),
    /// Place a protective stop
    StopLoss(RequestArgs),
    /// Assess risk across open positions
    Portfolio(RequestArgs),
    /// Replay a JSON array of price ticks through the circuit breaker
    Ticks(RequestArgs),
    /// Validate configuration
    ValidateConfig(ValidateArgs),
}

#[derive(clap::Args)]
pub struct RequestArgs {
    /// JSON request file, or `-` for stdin
    #[arg(short, long, default_value = "-")]
    pub input: PathBuf,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

#[derive(clap::Args)]
pub struct ValidateArgs {
    /// Print the effective configuration as TOML
    #[arg(long)]
    pub show: bool,
}
