//! Risk engine for trading decisions.
//!
//! Provides position sizing, trade and portfolio assessment, stop-loss
//! placement, and the circuit breaker, drawdown and daily-loss guards.

mod assessor;
mod circuit_breaker;
mod config_cache;
mod correlation;
mod daily_loss;
mod drawdown;
mod engine;
mod history;
mod numeric;
mod portfolio;
mod position_sizer;
mod protection;
mod state;
mod stop_loss;

pub use assessor::RiskAssessor;
pub use circuit_breaker::CircuitBreaker;
pub use config_cache::{ConfigCache, ConfigRefresh, DEFAULT_FETCH_TIMEOUT};
pub use correlation::{pearson, CorrelationEstimator, PriceHistory};
pub use daily_loss::{DailyLossGuard, DAILY_LOSS_HISTORY_CAP};
pub use drawdown::{DrawdownGuard, DRAWDOWN_HISTORY_CAP};
pub use engine::RiskEngine;
pub use history::BoundedHistory;
pub use portfolio::PortfolioRiskAssessor;
pub use position_sizer::PositionSizer;
pub use state::{RiskEngineState, DECISION_HISTORY_CAP};
pub use stop_loss::StopLossCalculator;
