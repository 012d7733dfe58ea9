//! Intraday loss protection.

use std::sync::Mutex;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{error, info, warn};

use risk_core::{
    DailyLossRequest, GuardAction, PerformanceRecord, ProtectionKind, ProtectionResult,
    RiskConfiguration, RiskError, RiskResult,
};

use crate::history::BoundedHistory;
use crate::protection::{classify, fractional_loss, unavailable, LossLimits};

/// Entries kept in the daily loss history.
pub const DAILY_LOSS_HISTORY_CAP: usize = 30;

#[derive(Debug)]
struct DailyInner {
    history: BoundedHistory<PerformanceRecord>,
    day: Option<NaiveDate>,
    day_start: Option<Decimal>,
}

/// Tracks the loss since the start of the UTC trading day.
#[derive(Debug)]
pub struct DailyLossGuard {
    inner: Mutex<DailyInner>,
}

impl Default for DailyLossGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl DailyLossGuard {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(DailyInner {
                history: BoundedHistory::new(DAILY_LOSS_HISTORY_CAP),
                day: None,
                day_start: None,
            }),
        }
    }

    /// Record a balance and decide whether trading should continue today.
    pub fn check(&self, request: &DailyLossRequest, config: &RiskConfiguration) -> RiskResult<ProtectionResult> {
        if let Some(start) = request.day_start_balance {
            if start <= Decimal::ZERO {
                return Err(RiskError::invalid(format!("day_start_balance must be positive, got {}", start)));
            }
        }

        let limits = LossLimits {
            soft: config.daily_loss_soft_limit,
            hard: config.daily_loss_hard_limit,
        };

        let mut inner = match self.inner.lock() {
            Ok(inner) => inner,
            Err(_) => {
                error!("Daily loss guard state poisoned, continuing conservatively");
                return Ok(unavailable(ProtectionKind::DailyLoss, limits));
            }
        };

        let today = request.timestamp.date_naive();
        let new_day = inner.day != Some(today);
        let carried = if new_day { None } else { inner.day_start };

        let baseline = request
            .day_start_balance
            .or(carried)
            .unwrap_or(request.current_balance);
        if baseline <= Decimal::ZERO {
            return Err(RiskError::invalid(format!(
                "no positive day-start balance to measure loss against (current {})",
                request.current_balance
            )));
        }

        if new_day {
            info!(day = %today, "New trading day for daily loss guard");
            inner.day = Some(today);
        }
        inner.day_start = Some(baseline);

        let loss = fractional_loss(baseline, request.current_balance);
        inner.history.push(PerformanceRecord {
            timestamp: request.timestamp,
            value: loss,
            balance: request.current_balance,
        });

        let result = classify(ProtectionKind::DailyLoss, loss, baseline, limits);
        match result.action {
            GuardAction::StopTrading => warn!(daily_loss = %loss, day_start = %baseline, "Daily loss hard limit breached"),
            GuardAction::ReducePositionSizes => info!(daily_loss = %loss, day_start = %baseline, "Daily loss soft limit breached"),
            GuardAction::ContinueTrading => {}
        }

        Ok(result)
    }

    /// Balance the current day is measured against.
    pub fn day_start(&self) -> Option<Decimal> {
        self.inner.lock().ok().and_then(|inner| inner.day_start)
    }

    /// Copy of the recorded history, oldest first.
    pub fn history(&self) -> Vec<PerformanceRecord> {
        match self.inner.lock() {
            Ok(inner) => inner.history.to_vec(),
            Err(poisoned) => poisoned.into_inner().history.to_vec(),
        }
    }

    /// Forget history and the day baseline.
    pub fn reset(&self) {
        let mut inner = match self.inner.lock() {
            Ok(inner) => inner,
            Err(poisoned) => poisoned.into_inner(),
        };
        inner.history.clear();
        inner.day = None;
        inner.day_start = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn on(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_first_balance_of_day_is_baseline() {
        let guard = DailyLossGuard::new();
        let config = RiskConfiguration::default();

        let opening = guard.check(&DailyLossRequest::new(dec!(10000), on(4, 9)), &config).unwrap();
        assert_eq!(opening.loss, Decimal::ZERO);
        assert_eq!(guard.day_start(), Some(dec!(10000)));

        let soft = guard.check(&DailyLossRequest::new(dec!(9650), on(4, 12)), &config).unwrap();
        assert_eq!(soft.loss, dec!(0.035));
        assert_eq!(soft.action, GuardAction::ReducePositionSizes);

        let hard = guard.check(&DailyLossRequest::new(dec!(9400), on(4, 15)), &config).unwrap();
        assert_eq!(hard.action, GuardAction::StopTrading);
        assert_eq!(hard.limit_checked, dec!(0.05));
    }

    #[test]
    fn test_new_day_resets_baseline() {
        let guard = DailyLossGuard::new();
        let config = RiskConfiguration::default();

        guard.check(&DailyLossRequest::new(dec!(10000), on(4, 9)), &config).unwrap();
        guard.check(&DailyLossRequest::new(dec!(9000), on(4, 16)), &config).unwrap();

        let next = guard.check(&DailyLossRequest::new(dec!(9000), on(5, 9)), &config).unwrap();
        assert_eq!(next.action, GuardAction::ContinueTrading);
        assert_eq!(guard.day_start(), Some(dec!(9000)));
    }

    #[test]
    fn test_explicit_day_start_wins() {
        let guard = DailyLossGuard::new();
        let config = RiskConfiguration::default();

        let result = guard
            .check(&DailyLossRequest::new(dec!(9000), on(4, 9)).with_day_start(dec!(10000)), &config)
            .unwrap();
        assert_eq!(result.loss, dec!(0.1));
        assert_eq!(result.action, GuardAction::StopTrading);
    }

    #[test]
    fn test_history_capped() {
        let guard = DailyLossGuard::new();
        let config = RiskConfiguration::default();

        for hour in 0..24 {
            for day in 1..=3 {
                guard.check(&DailyLossRequest::new(dec!(10000), on(day, hour)), &config).unwrap();
            }
        }
        assert_eq!(guard.history().len(), DAILY_LOSS_HISTORY_CAP);
    }

    #[test]
    fn test_rejected_check_keeps_day_baseline() {
        let guard = DailyLossGuard::new();
        let config = RiskConfiguration::default();

        guard.check(&DailyLossRequest::new(dec!(10000), on(1, 9)), &config).unwrap();
        let rejected = guard.check(&DailyLossRequest::new(Decimal::ZERO, on(2, 9)), &config);
        assert!(rejected.is_err());
        assert_eq!(guard.day_start(), Some(dec!(10000)));
        assert_eq!(guard.history().len(), 1);
    }
}
