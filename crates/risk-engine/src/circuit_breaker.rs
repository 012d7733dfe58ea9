//! Per-symbol circuit breaker for abrupt price moves.
//!
//! Each symbol moves through `Armed -> Triggered -> Cooldown -> Armed`.
//! Cooldown expiry is evaluated lazily on the next tick; there is no timer.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;
use tracing::{debug, error, warn};

use risk_core::{CircuitBreakerResult, CircuitPhase, GuardState, PriceTick, RiskConfiguration, RiskResult};

use crate::numeric::percent;

/// Circuit breaker state for every symbol seen so far.
///
/// The map only hands out per-symbol slots; the check-and-update for a tick
/// runs under that symbol's own mutex, so two ticks for the same symbol can
/// never both trip inside one cooldown window.
#[derive(Debug, Default)]
pub struct CircuitBreaker {
    states: DashMap<String, Arc<Mutex<GuardState>>>,
}

impl CircuitBreaker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate a price tick.
    pub fn check(&self, tick: &PriceTick, config: &RiskConfiguration) -> RiskResult<CircuitBreakerResult> {
        tick.validate()?;

        let outcome = Outcome {
            tick,
            // A move too large to represent is still a breach.
            price_change: (tick.current_price - tick.previous_price)
                .abs()
                .checked_div(tick.previous_price)
                .unwrap_or(Decimal::MAX),
            threshold: config.circuit_breaker_threshold,
        };

        if !config.circuit_breaker_enabled {
            return Ok(outcome.pass(CircuitPhase::Armed, None, "Circuit breaker disabled"));
        }

        let slot = self.slot(&tick.symbol);
        let mut state = match slot.lock() {
            Ok(state) => state,
            Err(_) => {
                error!(symbol = %tick.symbol, "Circuit breaker state poisoned, not triggering");
                return Ok(outcome.pass(CircuitPhase::Armed, None, "Guard state unavailable"));
            }
        };

        let cooldown = cooldown_duration(config.circuit_breaker_cooldown);
        let elapsed = state.last_trigger_time.map(|last| tick.timestamp - last);

        if elapsed.is_some_and(|e| e < Duration::zero()) {
            error!(
                symbol = %tick.symbol,
                tick = %tick.timestamp,
                last_trigger = ?state.last_trigger_time,
                "Tick precedes last trigger, not triggering"
            );
            return Ok(outcome.pass(CircuitPhase::Armed, None, "Tick timestamp precedes last trigger"));
        }

        let remaining = elapsed
            .filter(|e| *e < cooldown)
            .map(|e| remaining_secs(cooldown - e));

        if outcome.price_change < outcome.threshold {
            let phase = match remaining {
                Some(_) => CircuitPhase::Cooldown,
                None => CircuitPhase::Armed,
            };
            return Ok(outcome.pass(phase, remaining, "Price change within threshold"));
        }

        if let Some(secs) = remaining {
            debug!(symbol = %tick.symbol, remaining = secs, "Breach during cooldown");
            return Ok(outcome.pass(
                CircuitPhase::Cooldown,
                remaining,
                format!(
                    "Price moved {:.2}% but breaker is in cooldown",
                    percent(outcome.price_change)
                ),
            ));
        }

        state.triggered = true;
        state.last_trigger_time = Some(tick.timestamp);
        state.last_price_change = outcome.price_change;

        warn!(
            symbol = %tick.symbol,
            price_change = %outcome.price_change,
            threshold = %outcome.threshold,
            "Circuit breaker triggered"
        );

        Ok(outcome.trip(config.circuit_breaker_cooldown))
    }

    /// Current state for a symbol, if it has been checked before.
    pub fn state(&self, symbol: &str) -> Option<GuardState> {
        let slot = self.states.get(symbol)?.clone();
        let state = match slot.lock() {
            Ok(state) => state.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        Some(state)
    }

    /// Phase of a symbol at a point in time.
    pub fn phase(&self, symbol: &str, now: DateTime<Utc>, config: &RiskConfiguration) -> CircuitPhase {
        let cooldown = cooldown_duration(config.circuit_breaker_cooldown);
        match self.state(symbol).and_then(|s| s.last_trigger_time) {
            Some(last) if now >= last && now - last < cooldown => CircuitPhase::Cooldown,
            _ => CircuitPhase::Armed,
        }
    }

    /// Number of symbols with state.
    pub fn tracked_symbols(&self) -> usize {
        self.states.len()
    }

    fn slot(&self, symbol: &str) -> Arc<Mutex<GuardState>> {
        self.states.entry(symbol.to_string()).or_default().clone()
    }
}

fn cooldown_duration(secs: u64) -> Duration {
    // Keep within chrono's representable range.
    let secs = i64::try_from(secs).unwrap_or(i64::MAX).min(i64::MAX / 1_000);
    Duration::seconds(secs)
}

fn remaining_secs(remaining: Duration) -> u64 {
    // Round partial seconds up so "0 remaining" only appears once expired.
    let millis = remaining.num_milliseconds().max(0) as u64;
    millis.div_ceil(1_000)
}

/// Shared fields of every result for one tick.
struct Outcome<'t> {
    tick: &'t PriceTick,
    price_change: Decimal,
    threshold: Decimal,
}

impl Outcome<'_> {
    fn pass(
        &self,
        state: CircuitPhase,
        cooldown_remaining: Option<u64>,
        reason: impl Into<String>,
    ) -> CircuitBreakerResult {
        CircuitBreakerResult {
            symbol: self.tick.symbol.clone(),
            triggered: false,
            state,
            price_change: self.price_change,
            threshold: self.threshold,
            cooldown_remaining,
            reason: reason.into(),
        }
    }

    fn trip(&self, cooldown_secs: u64) -> CircuitBreakerResult {
        CircuitBreakerResult {
            symbol: self.tick.symbol.clone(),
            triggered: true,
            state: CircuitPhase::Triggered,
            price_change: self.price_change,
            threshold: self.threshold,
            cooldown_remaining: Some(cooldown_secs),
            reason: format!(
                "Price moved {:.2}%, exceeding the {:.2}% threshold",
                percent(self.price_change),
                percent(self.threshold)
            ),
        }
    }
}
