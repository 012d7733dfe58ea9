//! Typed risk configuration.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{RiskError, RiskResult};

/// Risk parameters consulted by every engine operation.
///
/// Every field has a built-in default, so a partial source (or no source at
/// all) still yields a complete configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfiguration {
    /// Conservative multiplier applied to Kelly and optimal-f fractions
    pub kelly_fraction: Decimal,
    /// Maximum position as a fraction of account balance
    pub max_position_size: Decimal,
    /// Lower clamp for volatility sizing
    pub min_volatility: Decimal,
    /// Upper clamp for volatility sizing
    pub max_volatility: Decimal,
    /// Volatility scaling for volatility sizing
    pub volatility_multiplier: Decimal,
    /// Default stop distance as a fraction of entry
    pub stop_loss_default: Decimal,
    /// Default take-profit distance as a fraction of entry
    pub take_profit_default: Decimal,
    /// Maximum fraction of the account a single trade may put at risk
    pub max_portfolio_risk: Decimal,
    /// Correlation above which a diversification warning is raised
    pub correlation_threshold: Decimal,
    pub circuit_breaker_enabled: bool,
    /// Fractional price move that trips the breaker
    pub circuit_breaker_threshold: Decimal,
    /// Cooldown after a trip, in seconds
    pub circuit_breaker_cooldown: u64,
    pub hard_drawdown_limit: Decimal,
    pub soft_drawdown_limit: Decimal,
    pub daily_loss_hard_limit: Decimal,
    pub daily_loss_soft_limit: Decimal,
    /// Prices retained per symbol for correlation estimates
    pub correlation_lookback: usize,
    /// Minimum aligned returns before a pair contributes a correlation
    pub correlation_min_samples: usize,
}

impl Default for RiskConfiguration {
    fn default() -> Self {
        Self {
            kelly_fraction: dec!(0.25),
            max_position_size: dec!(0.10),
            min_volatility: dec!(0.01),
            max_volatility: dec!(0.50),
            volatility_multiplier: dec!(2.0),
            stop_loss_default: dec!(0.02),
            take_profit_default: dec!(0.04),
            max_portfolio_risk: dec!(0.05),
            correlation_threshold: dec!(0.70),
            circuit_breaker_enabled: true,
            circuit_breaker_threshold: dec!(0.10),
            circuit_breaker_cooldown: 300,
            hard_drawdown_limit: dec!(0.20),
            soft_drawdown_limit: dec!(0.10),
            daily_loss_hard_limit: dec!(0.05),
            daily_loss_soft_limit: dec!(0.03),
            correlation_lookback: 250,
            correlation_min_samples: 10,
        }
    }
}

/// Outcome of merging provider values over the defaults.
#[derive(Debug, Clone)]
pub struct ConfigMerge {
    pub config: RiskConfiguration,
    /// Known keys whose values could not be parsed; defaults were kept
    pub rejected: Vec<String>,
    /// Keys the engine does not recognise
    pub ignored: Vec<String>,
}

impl ConfigMerge {
    /// True when every supplied key was applied.
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

impl RiskConfiguration {
    /// Build a configuration from a raw name/value mapping.
    ///
    /// Values may be plain scalars or records of the form `{"value": x}`;
    /// both are accepted here so nothing downstream has to care. Each key is
    /// applied on its own, so one bad value only loses that key.
    pub fn from_map(values: &Map<String, Value>) -> RiskResult<ConfigMerge> {
        let mut merged = match serde_json::to_value(Self::default())? {
            Value::Object(map) => map,
            _ => return Err(RiskError::Internal("default configuration is not a map".into())),
        };

        let mut rejected = Vec::new();
        let mut ignored = Vec::new();

        for (key, raw) in values {
            if !merged.contains_key(key) {
                ignored.push(key.clone());
                continue;
            }

            let value = unwrap_value_record(raw);
            let mut candidate = merged.clone();
            candidate.insert(key.clone(), value.clone());

            if serde_json::from_value::<Self>(Value::Object(candidate)).is_ok() {
                merged.insert(key.clone(), value);
            } else {
                rejected.push(key.clone());
            }
        }

        let config: Self = serde_json::from_value(Value::Object(merged))?;
        config.validate()?;

        Ok(ConfigMerge {
            config,
            rejected,
            ignored,
        })
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> RiskResult<()> {
        let fractions = [
            ("kelly_fraction", self.kelly_fraction),
            ("max_position_size", self.max_position_size),
            ("max_portfolio_risk", self.max_portfolio_risk),
            ("correlation_threshold", self.correlation_threshold),
            ("hard_drawdown_limit", self.hard_drawdown_limit),
            ("soft_drawdown_limit", self.soft_drawdown_limit),
            ("daily_loss_hard_limit", self.daily_loss_hard_limit),
            ("daily_loss_soft_limit", self.daily_loss_soft_limit),
        ];
        for (name, value) in fractions {
            if value < Decimal::ZERO || value > Decimal::ONE {
                return Err(RiskError::Config(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        if self.min_volatility <= Decimal::ZERO || self.min_volatility > self.max_volatility {
            return Err(RiskError::Config(format!(
                "volatility bounds invalid: min {} max {}",
                self.min_volatility, self.max_volatility
            )));
        }

        if self.volatility_multiplier <= Decimal::ZERO {
            return Err(RiskError::Config(
                "volatility_multiplier must be positive".to_string(),
            ));
        }

        if self.stop_loss_default <= Decimal::ZERO || self.stop_loss_default >= Decimal::ONE {
            return Err(RiskError::Config(format!(
                "stop_loss_default must be within (0, 1), got {}",
                self.stop_loss_default
            )));
        }

        if self.circuit_breaker_threshold <= Decimal::ZERO {
            return Err(RiskError::Config(
                "circuit_breaker_threshold must be positive".to_string(),
            ));
        }

        if self.soft_drawdown_limit > self.hard_drawdown_limit {
            return Err(RiskError::Config(format!(
                "soft_drawdown_limit {} exceeds hard_drawdown_limit {}",
                self.soft_drawdown_limit, self.hard_drawdown_limit
            )));
        }

        if self.daily_loss_soft_limit > self.daily_loss_hard_limit {
            return Err(RiskError::Config(format!(
                "daily_loss_soft_limit {} exceeds daily_loss_hard_limit {}",
                self.daily_loss_soft_limit, self.daily_loss_hard_limit
            )));
        }

        if self.correlation_min_samples < 2 || self.correlation_lookback <= self.correlation_min_samples {
            return Err(RiskError::Config(format!(
                "correlation_lookback {} must exceed correlation_min_samples {} (min 2)",
                self.correlation_lookback, self.correlation_min_samples
            )));
        }

        Ok(())
    }
}

fn unwrap_value_record(raw: &Value) -> Value {
    match raw {
        Value::Object(record) => record.get("value").cloned().unwrap_or_else(|| raw.clone()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = RiskConfiguration::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.kelly_fraction, dec!(0.25));
        assert_eq!(config.circuit_breaker_cooldown, 300);
    }

    #[test]
    fn test_partial_map_merges_over_defaults() {
        let map = as_map(json!({
            "max_position_size": 0.2,
            "circuit_breaker_cooldown": 60,
        }));

        let merge = RiskConfiguration::from_map(&map).unwrap();
        assert!(merge.is_clean());
        assert_eq!(merge.config.max_position_size, dec!(0.2));
        assert_eq!(merge.config.circuit_breaker_cooldown, 60);
        assert_eq!(merge.config.kelly_fraction, dec!(0.25));
    }

    #[test]
    fn test_value_records_are_unwrapped() {
        let map = as_map(json!({
            "kelly_fraction": { "value": 0.5, "description": "half kelly" },
            "circuit_breaker_enabled": { "value": false },
        }));

        let merge = RiskConfiguration::from_map(&map).unwrap();
        assert_eq!(merge.config.kelly_fraction, dec!(0.5));
        assert!(!merge.config.circuit_breaker_enabled);
    }

    #[test]
    fn test_bad_values_keep_defaults() {
        let map = as_map(json!({
            "max_portfolio_risk": "lots",
            "take_profit_default": 0.06,
            "favourite_colour": "green",
        }));

        let merge = RiskConfiguration::from_map(&map).unwrap();
        assert_eq!(merge.rejected, vec!["max_portfolio_risk".to_string()]);
        assert_eq!(merge.ignored, vec!["favourite_colour".to_string()]);
        assert_eq!(merge.config.max_portfolio_risk, dec!(0.05));
        assert_eq!(merge.config.take_profit_default, dec!(0.06));
    }

    #[test]
    fn test_inverted_limits_rejected() {
        let map = as_map(json!({
            "soft_drawdown_limit": 0.3,
            "hard_drawdown_limit": 0.2,
        }));

        assert!(matches!(
            RiskConfiguration::from_map(&map),
            Err(RiskError::Config(_))
        ));
    }
}
