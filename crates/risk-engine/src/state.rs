//! Mutable state owned by the engine.

use std::sync::Mutex;

use risk_core::RiskAssessmentResult;

use crate::history::BoundedHistory;
use crate::{CircuitBreaker, DailyLossGuard, DrawdownGuard, PriceHistory};

/// Assessments kept for inspection.
pub const DECISION_HISTORY_CAP: usize = 100;

/// Every piece of state the guards keep between calls.
///
/// Each member does its own locking, so the state can be shared behind a
/// plain reference.
#[derive(Debug)]
pub struct RiskEngineState {
    circuit_breaker: CircuitBreaker,
    drawdown: DrawdownGuard,
    daily_loss: DailyLossGuard,
    prices: PriceHistory,
    decisions: Mutex<BoundedHistory<RiskAssessmentResult>>,
}

impl Default for RiskEngineState {
    fn default() -> Self {
        Self::new()
    }
}

impl RiskEngineState {
    pub fn new() -> Self {
        Self {
            circuit_breaker: CircuitBreaker::new(),
            drawdown: DrawdownGuard::new(),
            daily_loss: DailyLossGuard::new(),
            prices: PriceHistory::new(),
            decisions: Mutex::new(BoundedHistory::new(DECISION_HISTORY_CAP)),
        }
    }

    pub fn circuit_breaker(&self) -> &CircuitBreaker {
        &self.circuit_breaker
    }

    pub fn drawdown(&self) -> &DrawdownGuard {
        &self.drawdown
    }

    pub fn daily_loss(&self) -> &DailyLossGuard {
        &self.daily_loss
    }

    pub fn prices(&self) -> &PriceHistory {
        &self.prices
    }

    /// Remember an assessment.
    pub fn record_decision(&self, result: RiskAssessmentResult) {
        let mut decisions = match self.decisions.lock() {
            Ok(decisions) => decisions,
            Err(poisoned) => poisoned.into_inner(),
        };
        decisions.push(result);
    }

    /// Recent assessments, oldest first.
    pub fn decisions(&self) -> Vec<RiskAssessmentResult> {
        match self.decisions.lock() {
            Ok(decisions) => decisions.to_vec(),
            Err(poisoned) => poisoned.into_inner().to_vec(),
        }
    }
}
