//! Stop-loss placement.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Side;
use crate::error::{RiskError, RiskResult};

/// How the stop distance was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopLossMethod {
    /// Caller-supplied percentage
    Percentage,
    /// Volatility times ATR multiplier
    Volatility,
    /// Configured default distance
    Default,
}

/// Request to place a protective stop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopLossRequest {
    pub symbol: String,
    pub entry_price: Decimal,
    pub current_price: Decimal,
    pub side: Side,
    #[serde(default)]
    pub volatility: Option<Decimal>,
    #[serde(default)]
    pub atr_multiplier: Option<Decimal>,
    /// Stop distance as a fraction of entry (0.05 = 5%)
    #[serde(default)]
    pub percentage: Option<Decimal>,
}

impl StopLossRequest {
    /// Create a request that uses the configured default distance.
    pub fn new(symbol: impl Into<String>, entry_price: Decimal, side: Side) -> Self {
        Self {
            symbol: symbol.into(),
            entry_price,
            current_price: entry_price,
            side,
            volatility: None,
            atr_multiplier: None,
            percentage: None,
        }
    }

    pub fn with_percentage(mut self, percentage: Decimal) -> Self {
        self.percentage = Some(percentage);
        self
    }

    pub fn with_volatility(mut self, volatility: Decimal, atr_multiplier: Option<Decimal>) -> Self {
        self.volatility = Some(volatility);
        self.atr_multiplier = atr_multiplier;
        self
    }

    /// Reject malformed requests.
    pub fn validate(&self) -> RiskResult<()> {
        if self.entry_price <= Decimal::ZERO {
            return Err(RiskError::invalid(format!(
                "entry_price must be positive, got {}",
                self.entry_price
            )));
        }
        Ok(())
    }
}

/// A computed stop level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopLossResult {
    pub symbol: String,
    pub stop_loss: Decimal,
    /// Distance from entry as a fraction of entry
    pub stop_distance: Decimal,
    pub method: StopLossMethod,
}
