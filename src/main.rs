//! Risk engine CLI application.

mod cli;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use risk_config::{load_config, FileConfigProvider};
use risk_engine::RiskEngine;
use risk_monitor::{setup_logging, TracingEventSink};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::ValidateConfig(args) = &cli.command {
        return cli::commands::validate::run(cli.config.as_deref(), args.show);
    }

    let config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;

    // Setup logging
    let log_level = cli
        .log_level
        .map(|level| level.as_str().to_string())
        .unwrap_or_else(|| config.logging.level.clone());
    let log_file = cli
        .log_file
        .clone()
        .or_else(|| config.logging.file.as_ref().map(Into::into));
    let _log_guard = setup_logging(
        &log_level,
        cli.json_logs || config.logging.is_json(),
        log_file.as_deref(),
    );

    let engine = RiskEngine::new(config.risk.clone()).with_sink(Arc::new(TracingEventSink::new()));

    if let Some(params) = &cli.params {
        let outcome = engine.refresh_config(&FileConfigProvider::new(params)).await;
        if outcome.applied {
            info!(path = %params.display(), "Applied dynamic risk parameters");
        } else {
            warn!(path = %params.display(), error = ?outcome.error, "Using configured risk parameters");
        }
    }

    // Execute command
    match &cli.command {
        Commands::Size(args) => cli::commands::request::size(&engine, args),
        Commands::Assess(args) => cli::commands::request::assess(&engine, args),
        Commands::StopLoss(args) => cli::commands::request::stop_loss(&engine, args),
        Commands::Portfolio(args) => cli::commands::request::portfolio(&engine, args),
        Commands::Ticks(args) => cli::commands::ticks::run(&engine, args),
        Commands::ValidateConfig(_) => Ok(()),
    }
}
