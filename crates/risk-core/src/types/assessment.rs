//! Single-trade risk assessment.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Side;
use crate::error::{RiskError, RiskResult};

/// Coarse risk classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
        }
    }
}

/// A position already held when a new trade is assessed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExistingPosition {
    pub symbol: String,
    pub size: Decimal,
}

impl ExistingPosition {
    pub fn new(symbol: impl Into<String>, size: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            size,
        }
    }
}

/// Request to assess a proposed trade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessmentRequest {
    pub symbol: String,
    /// Position size in account currency
    pub position_size: Decimal,
    pub entry_price: Decimal,
    pub current_price: Decimal,
    pub side: Side,
    pub account_balance: Decimal,
    #[serde(default)]
    pub stop_loss: Option<Decimal>,
    #[serde(default)]
    pub take_profit: Option<Decimal>,
    #[serde(default)]
    pub existing_positions: Vec<ExistingPosition>,
}

impl RiskAssessmentRequest {
    /// Reject malformed requests.
    pub fn validate(&self) -> RiskResult<()> {
        if self.account_balance <= Decimal::ZERO {
            return Err(RiskError::invalid(format!(
                "account_balance must be positive, got {}",
                self.account_balance
            )));
        }
        if self.entry_price <= Decimal::ZERO || self.current_price <= Decimal::ZERO {
            return Err(RiskError::invalid(format!(
                "prices must be positive, got entry {} current {}",
                self.entry_price, self.current_price
            )));
        }
        if self.position_size < Decimal::ZERO {
            return Err(RiskError::invalid(format!(
                "position_size must not be negative, got {}",
                self.position_size
            )));
        }
        for level in [self.stop_loss, self.take_profit].into_iter().flatten() {
            if level <= Decimal::ZERO {
                return Err(RiskError::invalid(format!(
                    "stop_loss/take_profit must be positive, got {}",
                    level
                )));
            }
        }
        Ok(())
    }
}

/// Outcome of assessing one trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessmentResult {
    pub symbol: String,
    pub risk_level: RiskLevel,
    /// Fraction of the account lost if the stop is hit
    pub portfolio_risk: Decimal,
    /// Loss to stop as a fraction of entry
    pub potential_loss: Decimal,
    /// Gain to target as a fraction of entry
    pub potential_profit: Decimal,
    pub risk_reward_ratio: Decimal,
    pub correlation_risk: Decimal,
    /// Side-adjusted move from entry to current price
    pub unrealized_return: Decimal,
    pub recommendations: Vec<String>,
    pub approved: bool,
}
