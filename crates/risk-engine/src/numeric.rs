//! Overflow-checked decimal arithmetic.
//!
//! `Decimal` operators panic when a result leaves its 96-bit range, so every
//! computation on caller-supplied numbers goes through these helpers instead.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use risk_core::{RiskError, RiskResult};

fn out_of_range(what: &str) -> RiskError {
    RiskError::invalid(format!("{} is out of the representable range", what))
}

pub(crate) fn add(lhs: Decimal, rhs: Decimal, what: &str) -> RiskResult<Decimal> {
    lhs.checked_add(rhs).ok_or_else(|| out_of_range(what))
}

pub(crate) fn sub(lhs: Decimal, rhs: Decimal, what: &str) -> RiskResult<Decimal> {
    lhs.checked_sub(rhs).ok_or_else(|| out_of_range(what))
}

pub(crate) fn mul(lhs: Decimal, rhs: Decimal, what: &str) -> RiskResult<Decimal> {
    lhs.checked_mul(rhs).ok_or_else(|| out_of_range(what))
}

/// Division; a zero divisor is reported the same way as an overflow.
pub(crate) fn div(lhs: Decimal, rhs: Decimal, what: &str) -> RiskResult<Decimal> {
    lhs.checked_div(rhs).ok_or_else(|| out_of_range(what))
}

pub(crate) fn sum<I>(values: I, what: &str) -> RiskResult<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| add(acc, v, what))
}

/// A fraction as a percentage, saturating for display.
pub(crate) fn percent(fraction: Decimal) -> Decimal {
    fraction.saturating_mul(dec!(100))
}

/// Trim to `dp` places and drop trailing zeros.
pub(crate) fn tidy(value: Decimal, dp: u32) -> Decimal {
    value.round_dp(dp).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overflow_is_an_error() {
        assert!(matches!(
            div(dec!(100), dec!(0.0000000000000000000000000001), "ratio"),
            Err(RiskError::InvalidInput(_))
        ));
        assert!(mul(Decimal::MAX, dec!(2), "size").is_err());
        assert!(sum([Decimal::MAX, Decimal::ONE], "total").is_err());
        assert!(div(Decimal::ONE, Decimal::ZERO, "ratio").is_err());
    }

    #[test]
    fn test_in_range_values_pass_through() {
        assert_eq!(div(dec!(3), dec!(4), "ratio").unwrap(), dec!(0.75));
        assert_eq!(sum([dec!(1.5), dec!(2.5)], "total").unwrap(), dec!(4));
        assert_eq!(percent(Decimal::MAX), Decimal::MAX);
    }

    #[test]
    fn test_tidy_drops_trailing_zeros() {
        let value = dec!(900.00000000000000000000000);
        assert_eq!(tidy(value, 8).to_string(), "900");
        assert_eq!(tidy(dec!(0.123456789), 8).to_string(), "0.12345679");
    }
}
