//! Peak-to-current drawdown protection.

use std::sync::Mutex;

use rust_decimal::Decimal;
use tracing::{error, info, warn};

use risk_core::{
    DrawdownRequest, GuardAction, PerformanceRecord, ProtectionKind, ProtectionResult,
    RiskConfiguration, RiskError, RiskResult,
};

use crate::history::BoundedHistory;
use crate::protection::{classify, fractional_loss, unavailable, LossLimits};

/// Entries kept in the drawdown history.
pub const DRAWDOWN_HISTORY_CAP: usize = 100;

#[derive(Debug)]
struct DrawdownInner {
    history: BoundedHistory<PerformanceRecord>,
    peak: Option<Decimal>,
}

/// Tracks account balance against its high-water mark.
#[derive(Debug)]
pub struct DrawdownGuard {
    inner: Mutex<DrawdownInner>,
}

impl Default for DrawdownGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawdownGuard {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(DrawdownInner {
                history: BoundedHistory::new(DRAWDOWN_HISTORY_CAP),
                peak: None,
            }),
        }
    }

    /// Record a balance and decide whether trading should continue.
    pub fn check(&self, request: &DrawdownRequest, config: &RiskConfiguration) -> RiskResult<ProtectionResult> {
        if let Some(peak) = request.peak_balance {
            if peak <= Decimal::ZERO {
                return Err(RiskError::invalid(format!("peak_balance must be positive, got {}", peak)));
            }
        }

        let limits = LossLimits {
            soft: config.soft_drawdown_limit,
            hard: config.hard_drawdown_limit,
        };

        let mut inner = match self.inner.lock() {
            Ok(inner) => inner,
            Err(_) => {
                error!("Drawdown guard state poisoned, continuing conservatively");
                return Ok(unavailable(ProtectionKind::Drawdown, limits));
            }
        };

        let tracked = inner
            .peak
            .into_iter()
            .chain(request.peak_balance)
            .chain(Some(request.current_balance))
            .max()
            .unwrap_or(request.current_balance);

        let baseline = request.peak_balance.unwrap_or(tracked);
        if baseline <= Decimal::ZERO {
            return Err(RiskError::invalid(format!(
                "no positive peak balance to measure drawdown against (current {})",
                request.current_balance
            )));
        }
        inner.peak = Some(tracked);

        let loss = fractional_loss(baseline, request.current_balance);
        inner.history.push(PerformanceRecord {
            timestamp: request.timestamp,
            value: loss,
            balance: request.current_balance,
        });

        let result = classify(ProtectionKind::Drawdown, loss, baseline, limits);
        match result.action {
            GuardAction::StopTrading => warn!(drawdown = %loss, peak = %baseline, "Drawdown hard limit breached"),
            GuardAction::ReducePositionSizes => info!(drawdown = %loss, peak = %baseline, "Drawdown soft limit breached"),
            GuardAction::ContinueTrading => {}
        }

        Ok(result)
    }

    /// High-water mark seen so far.
    pub fn peak(&self) -> Option<Decimal> {
        self.inner.lock().ok().and_then(|inner| inner.peak)
    }

    /// Copy of the recorded history, oldest first.
    pub fn history(&self) -> Vec<PerformanceRecord> {
        match self.inner.lock() {
            Ok(inner) => inner.history.to_vec(),
            Err(poisoned) => poisoned.into_inner().history.to_vec(),
        }
    }

    /// Forget history and the high-water mark.
    pub fn reset(&self) {
        let mut inner = match self.inner.lock() {
            Ok(inner) => inner,
            Err(poisoned) => poisoned.into_inner(),
        };
        inner.history.clear();
        inner.peak = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn at(secs: i64) -> chrono::DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_hard_limit_stops_trading() {
        let guard = DrawdownGuard::new();
        let config = RiskConfiguration::default();

        guard.check(&DrawdownRequest::new(dec!(10000), at(0)), &config).unwrap();
        let result = guard.check(&DrawdownRequest::new(dec!(7500), at(1)), &config).unwrap();

        assert_eq!(result.loss, dec!(0.25));
        assert_eq!(result.action, GuardAction::StopTrading);
        assert_eq!(result.limit_checked, dec!(0.20));
    }

    #[test]
    fn test_soft_limit_reduces_sizes() {
        let guard = DrawdownGuard::new();
        let config = RiskConfiguration::default();

        let result = guard
            .check(&DrawdownRequest::new(dec!(8800), at(0)).with_peak(dec!(10000)), &config)
            .unwrap();

        assert_eq!(result.loss, dec!(0.12));
        assert_eq!(result.action, GuardAction::ReducePositionSizes);
        assert_eq!(result.limit_checked, dec!(0.10));
    }

    #[test]
    fn test_peak_tracks_high_water_mark() {
        let guard = DrawdownGuard::new();
        let config = RiskConfiguration::default();

        for balance in [dec!(10000), dec!(12000), dec!(11000)] {
            guard.check(&DrawdownRequest::new(balance, at(0)), &config).unwrap();
        }
        assert_eq!(guard.peak(), Some(dec!(12000)));

        let result = guard.check(&DrawdownRequest::new(dec!(10800), at(1)), &config).unwrap();
        assert_eq!(result.loss, dec!(0.1));
        assert_eq!(result.action, GuardAction::ContinueTrading);
    }

    #[test]
    fn test_history_capped() {
        let guard = DrawdownGuard::new();
        let config = RiskConfiguration::default();

        for i in 0..250 {
            guard
                .check(&DrawdownRequest::new(dec!(10000) - Decimal::from(i), at(i)), &config)
                .unwrap();
        }

        let history = guard.history();
        assert_eq!(history.len(), DRAWDOWN_HISTORY_CAP);
        assert_eq!(history[0].timestamp, at(150));
    }

    #[test]
    fn test_reset_clears_state() {
        let guard = DrawdownGuard::new();
        let config = RiskConfiguration::default();

        guard.check(&DrawdownRequest::new(dec!(10000), at(0)), &config).unwrap();
        guard.reset();
        assert!(guard.history().is_empty());
        assert_eq!(guard.peak(), None);
    }

    #[test]
    fn test_rejected_check_leaves_state_untouched() {
        let guard = DrawdownGuard::new();
        let config = RiskConfiguration::default();

        let result = guard.check(&DrawdownRequest::new(Decimal::ZERO, at(0)), &config);
        assert!(matches!(result, Err(RiskError::InvalidInput(_))));
        assert_eq!(guard.peak(), None);
        assert!(guard.history().is_empty());
    }
}
