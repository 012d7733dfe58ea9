//! Portfolio-wide risk aggregation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::RiskLevel;
use crate::error::{RiskError, RiskResult};

/// An open position as seen by portfolio risk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioPosition {
    pub symbol: String,
    /// Market value in account currency
    pub value: Decimal,
    /// Fraction of value at risk
    pub risk: Decimal,
    /// Expected return as a fraction, if the caller has one
    #[serde(default)]
    pub expected_return: Option<Decimal>,
}

impl PortfolioPosition {
    pub fn new(symbol: impl Into<String>, value: Decimal, risk: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            value,
            risk,
            expected_return: None,
        }
    }

    pub fn with_expected_return(mut self, expected_return: Decimal) -> Self {
        self.expected_return = Some(expected_return);
        self
    }
}

/// Snapshot of the portfolio to assess.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioRiskRequest {
    #[serde(default)]
    pub positions: Vec<PortfolioPosition>,
    pub account_balance: Decimal,
    #[serde(default)]
    pub risk_free_rate: Decimal,
}

impl PortfolioRiskRequest {
    /// Reject malformed requests.
    pub fn validate(&self) -> RiskResult<()> {
        if self.account_balance <= Decimal::ZERO {
            return Err(RiskError::invalid(format!(
                "account_balance must be positive, got {}",
                self.account_balance
            )));
        }
        for position in &self.positions {
            if position.value < Decimal::ZERO || position.risk < Decimal::ZERO {
                return Err(RiskError::invalid(format!(
                    "position {} has negative value or risk",
                    position.symbol
                )));
            }
        }
        Ok(())
    }
}

/// Risk contributed by one position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionRisk {
    pub symbol: String,
    pub value: Decimal,
    /// value * risk, in account currency
    pub risk_amount: Decimal,
    /// risk_amount as a percentage of portfolio value
    pub risk_share: Decimal,
}

/// Aggregated portfolio risk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioRiskResult {
    pub total_risk: Decimal,
    pub portfolio_value: Decimal,
    pub portfolio_risk_percentage: Decimal,
    pub exposure_percentage: Decimal,
    pub risk_level: RiskLevel,
    pub positions: Vec<PositionRisk>,
    pub risk_adjusted_return: Option<Decimal>,
    pub recommendations: Vec<String>,
}
