//! Configuration management.

mod provider;
mod settings;

pub use provider::FileConfigProvider;
pub use settings::{AppConfig, AppSettings, LoggingConfig};

use config::{Config, Environment, File, FileFormat};
use std::path::Path;

/// Prefix for environment overrides, e.g. `RISK__RISK__KELLY_FRACTION`.
pub const ENV_PREFIX: &str = "RISK";

/// Errors raised while loading or rendering configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("failed to render configuration: {0}")]
    Render(#[from] toml::ser::Error),

    #[error("invalid risk configuration: {0}")]
    Invalid(#[from] risk_core::RiskError),
}

/// Load configuration from an optional file and the environment.
///
/// A missing path is only an error when one was given explicitly.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(File::from(path).required(true));
    }

    let config = builder.add_source(environment()).build()?;
    finish(config.try_deserialize()?)
}

/// Load configuration from TOML text, still honouring environment overrides.
pub fn load_config_str(contents: &str) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from_str(contents, FileFormat::Toml))
        .add_source(environment())
        .build()?;

    finish(config.try_deserialize()?)
}

/// Render the effective configuration as TOML.
pub fn render_config(config: &AppConfig) -> Result<String, ConfigError> {
    Ok(toml::to_string_pretty(config)?)
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}

fn finish(config: AppConfig) -> Result<AppConfig, ConfigError> {
    config.risk.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_empty_source_yields_defaults() {
        let config = load_config_str("").unwrap();
        assert_eq!(config.app.name, "risk-engine");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.risk.kelly_fraction, dec!(0.25));
    }

    #[test]
    fn test_partial_risk_table() {
        let config = load_config_str(
            r#"
            [logging]
            format = "json"

            [risk]
            max_position_size = 0.05
            circuit_breaker_cooldown = 120
            "#,
        )
        .unwrap();

        assert_eq!(config.logging.format, "json");
        assert_eq!(config.risk.max_position_size, dec!(0.05));
        assert_eq!(config.risk.circuit_breaker_cooldown, 120);
        assert_eq!(config.risk.hard_drawdown_limit, dec!(0.20));
    }

    #[test]
    fn test_invalid_limits_rejected() {
        let result = load_config_str(
            r#"
            [risk]
            daily_loss_soft_limit = 0.08
            daily_loss_hard_limit = 0.05
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_missing_file_is_error() {
        let result = load_config(Some(Path::new("/nonexistent/risk.toml")));
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }

    #[test]
    fn test_render_round_trips() {
        let config = AppConfig::default();
        let rendered = render_config(&config).unwrap();
        assert!(rendered.contains("[risk]"));

        let reloaded = load_config_str(&rendered).unwrap();
        assert_eq!(reloaded.risk, config.risk);
    }
}
