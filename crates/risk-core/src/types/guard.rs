//! Protective guard inputs, state and decisions.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{RiskError, RiskResult};

/// A price observation for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTick {
    pub symbol: String,
    pub previous_price: Decimal,
    pub current_price: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl PriceTick {
    pub fn new(
        symbol: impl Into<String>,
        previous_price: Decimal,
        current_price: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            previous_price,
            current_price,
            timestamp,
        }
    }

    /// Reject malformed ticks.
    pub fn validate(&self) -> RiskResult<()> {
        if self.previous_price <= Decimal::ZERO {
            return Err(RiskError::invalid(format!(
                "previous_price must be positive, got {}",
                self.previous_price
            )));
        }
        if self.current_price < Decimal::ZERO {
            return Err(RiskError::invalid(format!(
                "current_price must not be negative, got {}",
                self.current_price
            )));
        }
        Ok(())
    }
}

/// Circuit breaker phase for a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitPhase {
    Armed,
    Triggered,
    Cooldown,
}

/// Persistent per-symbol circuit breaker state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuardState {
    pub triggered: bool,
    pub last_trigger_time: Option<DateTime<Utc>>,
    pub last_price_change: Decimal,
}

/// Outcome of a circuit breaker check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitBreakerResult {
    pub symbol: String,
    pub triggered: bool,
    pub state: CircuitPhase,
    pub price_change: Decimal,
    pub threshold: Decimal,
    /// Seconds left before the breaker can trip again
    pub cooldown_remaining: Option<u64>,
    pub reason: String,
}

/// What the caller should do after a performance check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardAction {
    ContinueTrading,
    ReducePositionSizes,
    StopTrading,
}

impl GuardAction {
    /// True for anything other than `ContinueTrading`.
    pub fn is_protective(&self) -> bool {
        !matches!(self, GuardAction::ContinueTrading)
    }
}

impl std::fmt::Display for GuardAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GuardAction::ContinueTrading => write!(f, "continue_trading"),
            GuardAction::ReducePositionSizes => write!(f, "reduce_position_sizes"),
            GuardAction::StopTrading => write!(f, "stop_trading"),
        }
    }
}

/// Which performance guard produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtectionKind {
    Drawdown,
    DailyLoss,
}

/// One entry of a guard's performance history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRecord {
    pub timestamp: DateTime<Utc>,
    /// Fractional loss against the baseline
    pub value: Decimal,
    pub balance: Decimal,
}

/// Input to the drawdown guard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawdownRequest {
    pub current_balance: Decimal,
    /// Peak balance; the guard's own high-water mark is used when absent
    #[serde(default)]
    pub peak_balance: Option<Decimal>,
    pub timestamp: DateTime<Utc>,
}

impl DrawdownRequest {
    pub fn new(current_balance: Decimal, timestamp: DateTime<Utc>) -> Self {
        Self {
            current_balance,
            peak_balance: None,
            timestamp,
        }
    }

    pub fn with_peak(mut self, peak_balance: Decimal) -> Self {
        self.peak_balance = Some(peak_balance);
        self
    }
}

/// Input to the daily loss guard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyLossRequest {
    pub current_balance: Decimal,
    /// Balance at the start of the trading day; tracked per UTC day when absent
    #[serde(default)]
    pub day_start_balance: Option<Decimal>,
    pub timestamp: DateTime<Utc>,
}

impl DailyLossRequest {
    pub fn new(current_balance: Decimal, timestamp: DateTime<Utc>) -> Self {
        Self {
            current_balance,
            day_start_balance: None,
            timestamp,
        }
    }

    pub fn with_day_start(mut self, day_start_balance: Decimal) -> Self {
        self.day_start_balance = Some(day_start_balance);
        self
    }
}

/// Decision from a drawdown or daily loss check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtectionResult {
    pub kind: ProtectionKind,
    /// Fractional loss against the baseline
    pub loss: Decimal,
    pub baseline: Decimal,
    /// The limit the loss was judged against
    pub limit_checked: Decimal,
    pub action: GuardAction,
    pub reason: String,
}
