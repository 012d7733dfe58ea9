//! Validate configuration command.

use anyhow::Result;
use risk_config::{load_config, render_config};
use std::path::Path;

pub fn run(config_path: Option<&Path>, show: bool) -> Result<()> {
    match config_path {
        Some(path) => println!("Validating configuration: {}", path.display()),
        None => println!("Validating built-in defaults and environment overrides"),
    }

    match load_config(config_path) {
        Ok(config) => {
            println!("Configuration is valid!");
            println!();
            println!("App: {}", config.app.name);
            println!("Environment: {}", config.app.environment);
            println!("Log level: {}", config.logging.level);
            println!("Max position: {}", config.risk.max_position_size);
            println!("Max trade risk: {}", config.risk.max_portfolio_risk);
            println!(
                "Circuit breaker: {} (threshold {}, cooldown {}s)",
                if config.risk.circuit_breaker_enabled { "enabled" } else { "disabled" },
                config.risk.circuit_breaker_threshold,
                config.risk.circuit_breaker_cooldown
            );
            println!(
                "Drawdown limits: soft {} / hard {}",
                config.risk.soft_drawdown_limit, config.risk.hard_drawdown_limit
            );
            println!(
                "Daily loss limits: soft {} / hard {}",
                config.risk.daily_loss_soft_limit, config.risk.daily_loss_hard_limit
            );

            if show {
                println!();
                print!("{}", render_config(&config)?);
            }
        }
        Err(e) => {
            println!("Configuration error: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
