//! Position sizing requests and results.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Side;
use crate::error::{RiskError, RiskResult};

/// Position sizing method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizingMethod {
    /// Kelly criterion scaled by the configured fraction
    Kelly,
    /// Inverse-volatility sizing
    Volatility,
    /// Fixed fraction of balance
    Fixed,
    /// Optimal f scaled by the configured fraction
    OptimalF,
}

impl std::fmt::Display for SizingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SizingMethod::Kelly => write!(f, "kelly"),
            SizingMethod::Volatility => write!(f, "volatility"),
            SizingMethod::Fixed => write!(f, "fixed"),
            SizingMethod::OptimalF => write!(f, "optimal_f"),
        }
    }
}

/// Request to size a new position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionSizingRequest {
    pub symbol: String,
    pub side: Side,
    pub account_balance: Decimal,
    pub current_price: Decimal,
    pub method: SizingMethod,
    #[serde(default)]
    pub win_rate: Option<Decimal>,
    #[serde(default)]
    pub avg_win: Option<Decimal>,
    #[serde(default)]
    pub avg_loss: Option<Decimal>,
    #[serde(default)]
    pub volatility: Option<Decimal>,
    #[serde(default)]
    pub correlation: Option<Decimal>,
}

impl PositionSizingRequest {
    /// Create a request with no method-specific inputs.
    pub fn new(
        symbol: impl Into<String>,
        side: Side,
        account_balance: Decimal,
        current_price: Decimal,
        method: SizingMethod,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            account_balance,
            current_price,
            method,
            win_rate: None,
            avg_win: None,
            avg_loss: None,
            volatility: None,
            correlation: None,
        }
    }

    /// Attach win/loss statistics (Kelly, optimal f).
    pub fn with_trade_stats(mut self, win_rate: Decimal, avg_win: Decimal, avg_loss: Decimal) -> Self {
        self.win_rate = Some(win_rate);
        self.avg_win = Some(avg_win);
        self.avg_loss = Some(avg_loss);
        self
    }

    /// Attach volatility (volatility sizing).
    pub fn with_volatility(mut self, volatility: Decimal) -> Self {
        self.volatility = Some(volatility);
        self
    }

    /// Attach correlation with existing holdings.
    pub fn with_correlation(mut self, correlation: Decimal) -> Self {
        self.correlation = Some(correlation);
        self
    }

    /// Reject malformed requests.
    pub fn validate(&self) -> RiskResult<()> {
        if self.account_balance <= Decimal::ZERO {
            return Err(RiskError::invalid(format!(
                "account_balance must be positive, got {}",
                self.account_balance
            )));
        }
        if self.current_price <= Decimal::ZERO {
            return Err(RiskError::invalid(format!(
                "current_price must be positive, got {}",
                self.current_price
            )));
        }
        if let Some(p) = self.win_rate {
            if p < Decimal::ZERO || p > Decimal::ONE {
                return Err(RiskError::invalid(format!(
                    "win_rate must be within [0, 1], got {}",
                    p
                )));
            }
        }
        if let Some(c) = self.correlation {
            if c < -Decimal::ONE || c > Decimal::ONE {
                return Err(RiskError::invalid(format!(
                    "correlation must be within [-1, 1], got {}",
                    c
                )));
            }
        }
        if let Some(v) = self.volatility {
            if v < Decimal::ZERO {
                return Err(RiskError::invalid(format!(
                    "volatility must not be negative, got {}",
                    v
                )));
            }
        }
        Ok(())
    }
}

/// Result of a sizing calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSizingResult {
    pub symbol: String,
    /// Position size in account currency
    pub position_size: Decimal,
    /// Position size in instrument units
    pub units: Decimal,
    pub method_requested: SizingMethod,
    pub method_used: SizingMethod,
    /// Why the requested method was not used, if it wasn't
    pub fallback_reason: Option<String>,
    /// Position size as a percentage of balance
    pub risk_percentage: Decimal,
    /// Hard cap in account currency
    pub max_allowed: Decimal,
}

impl PositionSizingResult {
    /// True when a different method than requested was used.
    pub fn fell_back(&self) -> bool {
        self.method_used != self.method_requested
    }
}
