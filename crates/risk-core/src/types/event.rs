//! Risk events published to the orchestration layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

/// Agent name stamped on every event.
pub const RISK_AGENT: &str = "risk";

/// Event action classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskAction {
    PositionSizeCalculated,
    RiskAssessed,
    StopLossCalculated,
    PortfolioRiskAssessed,
    CircuitBreakerTriggered,
    DrawdownProtectionTriggered,
    DailyLossProtectionTriggered,
    /// Configuration could not be fetched or was partially invalid
    ConfigFallback,
}

impl RiskAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskAction::PositionSizeCalculated => "position_size_calculated",
            RiskAction::RiskAssessed => "risk_assessed",
            RiskAction::StopLossCalculated => "stop_loss_calculated",
            RiskAction::PortfolioRiskAssessed => "portfolio_risk_assessed",
            RiskAction::CircuitBreakerTriggered => "circuit_breaker_triggered",
            RiskAction::DrawdownProtectionTriggered => "drawdown_protection_triggered",
            RiskAction::DailyLossProtectionTriggered => "daily_loss_protection_triggered",
            RiskAction::ConfigFallback => "config_fallback",
        }
    }

    /// True for actions that report a guard tripping or degraded config.
    pub fn is_alert(&self) -> bool {
        matches!(
            self,
            RiskAction::CircuitBreakerTriggered
                | RiskAction::DrawdownProtectionTriggered
                | RiskAction::DailyLossProtectionTriggered
                | RiskAction::ConfigFallback
        )
    }
}

impl std::fmt::Display for RiskAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event emitted after a public engine operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskEvent {
    pub event_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub agent: String,
    pub action: RiskAction,
    pub data: Value,
}

impl RiskEvent {
    /// Create an event carrying raw data.
    pub fn new(action: RiskAction, data: Value) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            agent: RISK_AGENT.to_string(),
            action,
            data,
        }
    }

    /// Create an event from any serializable result.
    pub fn from_result<T: Serialize>(action: RiskAction, result: &T) -> Self {
        let data = serde_json::to_value(result)
            .unwrap_or_else(|err| json!({ "error": err.to_string() }));
        Self::new(action, data)
    }
}
