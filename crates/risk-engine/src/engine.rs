//! Unified risk engine.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use tracing::{info, warn};

use risk_core::{
    CircuitBreakerResult, ConfigurationProvider, DailyLossRequest, DrawdownRequest, EventSink,
    GuardState, NullEventSink, PortfolioRiskRequest, PortfolioRiskResult, PositionSizingRequest,
    PositionSizingResult, PriceTick, ProtectionResult, RiskAction, RiskAssessmentRequest,
    RiskAssessmentResult, RiskConfiguration, RiskEvent, RiskResult, StopLossRequest,
    StopLossResult,
};

use crate::{
    ConfigCache, ConfigRefresh, CorrelationEstimator, PortfolioRiskAssessor, PositionSizer,
    RiskAssessor, RiskEngineState, StopLossCalculator,
};

/// Single entry point for sizing, assessment and protection.
///
/// Every operation reads one configuration snapshot, so a refresh that lands
/// mid-call never mixes old and new parameters.
pub struct RiskEngine {
    config: ConfigCache,
    state: RiskEngineState,
    sink: Arc<dyn EventSink>,
}

impl RiskEngine {
    /// Create an engine with the given configuration and no event sink.
    pub fn new(config: RiskConfiguration) -> Self {
        Self {
            config: ConfigCache::new(config),
            state: RiskEngineState::new(),
            sink: Arc::new(NullEventSink),
        }
    }

    /// Publish events to `sink`.
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Bound how long a provider fetch may take.
    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.config = ConfigCache::new((*self.config.snapshot()).clone()).with_fetch_timeout(fetch_timeout);
        self
    }

    /// Current configuration snapshot.
    pub fn config(&self) -> Arc<RiskConfiguration> {
        self.config.snapshot()
    }

    pub fn state(&self) -> &RiskEngineState {
        &self.state
    }

    /// Pull fresh parameters from a provider.
    ///
    /// Falls back to the previous snapshot on any failure and reports the
    /// fallback as a `config_fallback` event.
    pub async fn refresh_config(&self, provider: &dyn ConfigurationProvider) -> ConfigRefresh {
        let outcome = self.config.refresh(provider).await;
        if outcome.is_fallback() {
            self.emit(RiskEvent::from_result(RiskAction::ConfigFallback, &outcome));
        }
        outcome
    }

    /// Size a new position.
    pub fn calculate_position_size(&self, request: &PositionSizingRequest) -> RiskResult<PositionSizingResult> {
        let config = self.config.snapshot();
        let result = observe("calculate_position_size", PositionSizer::new(&config).size(request))?;

        self.emit(RiskEvent::from_result(RiskAction::PositionSizeCalculated, &result));
        Ok(result)
    }

    /// Assess a proposed trade and record the decision.
    pub fn assess_risk(&self, request: &RiskAssessmentRequest) -> RiskResult<RiskAssessmentResult> {
        let config = self.config.snapshot();
        let correlation = CorrelationEstimator::new(self.state.prices(), config.correlation_min_samples);
        let result = observe("assess_risk", RiskAssessor::new(&config, correlation).assess(request))?;

        if !result.approved {
            info!(
                symbol = %result.symbol,
                portfolio_risk = %result.portfolio_risk,
                "Trade not approved"
            );
        }

        self.state.record_decision(result.clone());
        self.emit(RiskEvent::from_result(RiskAction::RiskAssessed, &result));
        Ok(result)
    }

    /// Place a protective stop.
    pub fn calculate_stop_loss(&self, request: &StopLossRequest) -> RiskResult<StopLossResult> {
        let config = self.config.snapshot();
        let result = observe("calculate_stop_loss", StopLossCalculator::new(&config).calculate(request))?;

        self.emit(RiskEvent::from_result(RiskAction::StopLossCalculated, &result));
        Ok(result)
    }

    /// Aggregate risk across open positions.
    pub fn assess_portfolio_risk(&self, request: &PortfolioRiskRequest) -> RiskResult<PortfolioRiskResult> {
        let result = observe("assess_portfolio_risk", PortfolioRiskAssessor::new().assess(request))?;

        self.emit(RiskEvent::from_result(RiskAction::PortfolioRiskAssessed, &result));
        Ok(result)
    }

    /// Run a price tick through the circuit breaker.
    ///
    /// The tick's current price is also recorded for correlation estimates.
    pub fn check_circuit_breaker(&self, tick: &PriceTick) -> RiskResult<CircuitBreakerResult> {
        let config = self.config.snapshot();
        let result = observe(
            "check_circuit_breaker",
            self.state.circuit_breaker().check(tick, &config),
        )?;

        self.state
            .prices()
            .record(&tick.symbol, tick.current_price, config.correlation_lookback);

        if result.triggered {
            self.emit(RiskEvent::from_result(RiskAction::CircuitBreakerTriggered, &result));
        }
        Ok(result)
    }

    /// Check account balance against drawdown limits.
    pub fn check_drawdown(&self, request: &DrawdownRequest) -> RiskResult<ProtectionResult> {
        let config = self.config.snapshot();
        let result = observe("check_drawdown", self.state.drawdown().check(request, &config))?;

        if result.action.is_protective() {
            self.emit(RiskEvent::from_result(RiskAction::DrawdownProtectionTriggered, &result));
        }
        Ok(result)
    }

    /// Check account balance against daily loss limits.
    pub fn check_daily_loss(&self, request: &DailyLossRequest) -> RiskResult<ProtectionResult> {
        let config = self.config.snapshot();
        let result = observe("check_daily_loss", self.state.daily_loss().check(request, &config))?;

        if result.action.is_protective() {
            self.emit(RiskEvent::from_result(RiskAction::DailyLossProtectionTriggered, &result));
        }
        Ok(result)
    }

    /// Forget drawdown and daily-loss baselines, e.g. after a deposit.
    pub fn reset_protection(&self) {
        info!("Resetting drawdown and daily loss baselines");
        self.state.drawdown().reset();
        self.state.daily_loss().reset();
    }

    /// Record a price observation without a circuit breaker check.
    pub fn record_price(&self, symbol: &str, price: Decimal) {
        let lookback = self.config.snapshot().correlation_lookback;
        self.state.prices().record(symbol, price, lookback);
    }

    /// Circuit breaker state for a symbol.
    pub fn circuit_state(&self, symbol: &str) -> Option<GuardState> {
        self.state.circuit_breaker().state(symbol)
    }

    /// Recent trade assessments, oldest first.
    pub fn recent_assessments(&self) -> Vec<RiskAssessmentResult> {
        self.state.decisions()
    }

    fn emit(&self, event: RiskEvent) {
        self.sink.emit(event);
    }
}

impl Default for RiskEngine {
    fn default() -> Self {
        Self::new(RiskConfiguration::default())
    }
}

fn observe<T>(operation: &'static str, result: RiskResult<T>) -> RiskResult<T> {
    if let Err(err) = &result {
        warn!(operation, error = %err, "Risk operation rejected");
    }
    result
}
