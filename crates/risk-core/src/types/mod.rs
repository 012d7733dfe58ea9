//! Core data types for the risk engine.

mod assessment;
mod event;
mod guard;
mod portfolio;
mod side;
mod sizing;
mod stop_loss;

pub use assessment::{ExistingPosition, RiskAssessmentRequest, RiskAssessmentResult, RiskLevel};
pub use event::{RiskAction, RiskEvent, RISK_AGENT};
pub use guard::{
    CircuitBreakerResult, CircuitPhase, DailyLossRequest, DrawdownRequest, GuardAction,
    GuardState, PerformanceRecord, PriceTick, ProtectionKind, ProtectionResult,
};
pub use portfolio::{PortfolioPosition, PortfolioRiskRequest, PortfolioRiskResult, PositionRisk};
pub use side::Side;
pub use sizing::{PositionSizingRequest, PositionSizingResult, SizingMethod};
pub use stop_loss::{StopLossMethod, StopLossRequest, StopLossResult};
