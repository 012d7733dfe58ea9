//! Limit classification shared by the performance guards.

use rust_decimal::Decimal;

use risk_core::{GuardAction, ProtectionKind, ProtectionResult};

use crate::numeric::percent;

/// Hard and soft loss limits for one guard.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LossLimits {
    pub soft: Decimal,
    pub hard: Decimal,
}

/// Fractional loss of `current` against `baseline`, floored at zero.
pub fn fractional_loss(baseline: Decimal, current: Decimal) -> Decimal {
    if baseline <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    // Saturate so an unrepresentable loss still reads as a breach.
    baseline
        .saturating_sub(current)
        .checked_div(baseline)
        .unwrap_or(Decimal::MAX)
        .max(Decimal::ZERO)
}

/// Classify a loss against its limits.
pub fn classify(kind: ProtectionKind, loss: Decimal, baseline: Decimal, limits: LossLimits) -> ProtectionResult {
    let label = match kind {
        ProtectionKind::Drawdown => "Drawdown",
        ProtectionKind::DailyLoss => "Daily loss",
    };

    let (action, limit_checked, reason) = if loss > limits.hard {
        (
            GuardAction::StopTrading,
            limits.hard,
            format!("{} {:.2}% exceeds hard limit {:.2}%", label, percent(loss), percent(limits.hard)),
        )
    } else if loss > limits.soft {
        (
            GuardAction::ReducePositionSizes,
            limits.soft,
            format!("{} {:.2}% exceeds soft limit {:.2}%", label, percent(loss), percent(limits.soft)),
        )
    } else {
        (
            GuardAction::ContinueTrading,
            limits.soft,
            format!("{} {:.2}% within limits", label, percent(loss)),
        )
    };

    ProtectionResult {
        kind,
        loss,
        baseline,
        limit_checked,
        action,
        reason,
    }
}

/// Result returned when a guard cannot read its own state.
pub fn unavailable(kind: ProtectionKind, limits: LossLimits) -> ProtectionResult {
    ProtectionResult {
        kind,
        loss: Decimal::ZERO,
        baseline: Decimal::ZERO,
        limit_checked: limits.soft,
        action: GuardAction::ContinueTrading,
        reason: "Guard state unavailable".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const LIMITS: LossLimits = LossLimits {
        soft: dec!(0.10),
        hard: dec!(0.20),
    };

    #[test]
    fn test_fractional_loss() {
        assert_eq!(fractional_loss(dec!(100), dec!(75)), dec!(0.25));
        assert_eq!(fractional_loss(dec!(100), dec!(120)), Decimal::ZERO);
        assert_eq!(fractional_loss(Decimal::ZERO, dec!(50)), Decimal::ZERO);
        assert_eq!(fractional_loss(dec!(0.0000000000000000000000000001), Decimal::MIN), Decimal::MAX);
    }

    #[test]
    fn test_classification_bands() {
        let stop = classify(ProtectionKind::Drawdown, dec!(0.25), dec!(100), LIMITS);
        assert_eq!(stop.action, GuardAction::StopTrading);
        assert_eq!(stop.limit_checked, dec!(0.20));

        let reduce = classify(ProtectionKind::Drawdown, dec!(0.12), dec!(100), LIMITS);
        assert_eq!(reduce.action, GuardAction::ReducePositionSizes);
        assert_eq!(reduce.limit_checked, dec!(0.10));

        // Limits are exclusive
        let edge = classify(ProtectionKind::DailyLoss, dec!(0.10), dec!(100), LIMITS);
        assert_eq!(edge.action, GuardAction::ContinueTrading);
        assert!(edge.reason.starts_with("Daily loss"));
    }
}
