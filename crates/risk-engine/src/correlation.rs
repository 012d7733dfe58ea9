//! Correlation between a candidate symbol and existing holdings.

use std::collections::VecDeque;

use dashmap::DashMap;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use statrs::statistics::Statistics;
use tracing::debug;

use risk_core::ExistingPosition;

/// Per-symbol bounded price history.
///
/// Each symbol is updated under its own map shard, so recording prices for
/// different symbols never contends.
#[derive(Debug, Default)]
pub struct PriceHistory {
    prices: DashMap<String, VecDeque<Decimal>>,
}

impl PriceHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a price, keeping at most `capacity` observations.
    pub fn record(&self, symbol: &str, price: Decimal, capacity: usize) {
        if price <= Decimal::ZERO || capacity == 0 {
            return;
        }

        let mut series = self.prices.entry(symbol.to_string()).or_default();
        series.push_back(price);
        while series.len() > capacity {
            series.pop_front();
        }
    }

    /// Number of prices held for a symbol.
    pub fn len(&self, symbol: &str) -> usize {
        self.prices.get(symbol).map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Simple returns between consecutive prices, oldest first.
    pub fn returns(&self, symbol: &str) -> Option<Vec<f64>> {
        let series = self.prices.get(symbol)?;
        let prices: Vec<f64> = series.iter().filter_map(|p| p.to_f64()).collect();
        drop(series);

        let returns: Vec<f64> = prices
            .windows(2)
            .filter(|w| w[0] != 0.0)
            .map(|w| (w[1] - w[0]) / w[0])
            .collect();

        if returns.is_empty() {
            None
        } else {
            Some(returns)
        }
    }
}

/// Pearson correlation of the most recent overlapping returns.
///
/// Returns `None` when fewer than `min_samples` points overlap or either
/// series is flat.
pub fn pearson(a: &[f64], b: &[f64], min_samples: usize) -> Option<f64> {
    let n = a.len().min(b.len());
    if n < min_samples.max(2) {
        return None;
    }

    let a = &a[a.len() - n..];
    let b = &b[b.len() - n..];

    let sd_a = a.std_dev();
    let sd_b = b.std_dev();
    if !(sd_a.is_finite() && sd_b.is_finite()) || sd_a == 0.0 || sd_b == 0.0 {
        return None;
    }

    let r = a.covariance(b) / (sd_a * sd_b);
    if r.is_finite() {
        Some(r.clamp(-1.0, 1.0))
    } else {
        None
    }
}

/// Estimates co-movement risk from recorded price history.
#[derive(Debug, Clone, Copy)]
pub struct CorrelationEstimator<'a> {
    history: &'a PriceHistory,
    min_samples: usize,
}

impl<'a> CorrelationEstimator<'a> {
    pub fn new(history: &'a PriceHistory, min_samples: usize) -> Self {
        Self {
            history,
            min_samples,
        }
    }

    /// Average positive correlation between `symbol` and each holding, in [0, 1].
    ///
    /// Negative correlation counts as zero. Holdings without enough shared
    /// history are left out of the average.
    pub fn estimate(&self, symbol: &str, existing: &[ExistingPosition]) -> Decimal {
        if existing.is_empty() {
            return Decimal::ZERO;
        }

        let candidate = self.history.returns(symbol);
        let mut total = 0.0;
        let mut counted = 0usize;

        for position in existing {
            let correlation = if position.symbol == symbol {
                Some(1.0)
            } else {
                candidate.as_deref().and_then(|ours| {
                    self.history
                        .returns(&position.symbol)
                        .and_then(|theirs| pearson(ours, &theirs, self.min_samples))
                })
            };

            match correlation {
                Some(r) => {
                    total += r.max(0.0);
                    counted += 1;
                }
                None => debug!(
                    symbol,
                    other = %position.symbol,
                    "Insufficient shared history for correlation"
                ),
            }
        }

        if counted == 0 {
            debug!(symbol, holdings = existing.len(), "No correlation could be estimated");
            return Decimal::ZERO;
        }

        Decimal::from_f64(total / counted as f64)
            .unwrap_or(Decimal::ZERO)
            .max(Decimal::ZERO)
            .min(Decimal::ONE)
            .round_dp(6)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn seed(history: &PriceHistory, symbol: &str, prices: &[f64]) {
        for p in prices {
            history.record(symbol, Decimal::from_f64(*p).unwrap(), 250);
        }
    }

    fn wave(scale: f64, invert: bool) -> Vec<f64> {
        let mut price = 100.0;
        let mut out = vec![price];
        for i in 0..30 {
            let step = (if i % 3 == 0 { 0.02 } else { -0.01 }) * scale;
            let step = if invert { -step } else { step };
            price *= 1.0 + step;
            out.push(price);
        }
        out
    }

    #[test]
    fn test_history_is_bounded() {
        let history = PriceHistory::new();
        for i in 1..=20 {
            history.record("BTC", Decimal::from(i), 5);
        }
        assert_eq!(history.len("BTC"), 5);
        assert_eq!(history.returns("BTC").unwrap().len(), 4);
    }

    #[test]
    fn test_pearson_perfect_and_inverse() {
        let a = [0.01, -0.02, 0.03, 0.00, -0.01];
        let b: Vec<f64> = a.iter().map(|x| x * 2.0).collect();
        let c: Vec<f64> = a.iter().map(|x| -x).collect();

        assert!((pearson(&a, &b, 3).unwrap() - 1.0).abs() < 1e-9);
        assert!((pearson(&a, &c, 3).unwrap() + 1.0).abs() < 1e-9);
        assert!(pearson(&a, &b, 10).is_none());
        assert!(pearson(&a, &[0.0; 5], 3).is_none());
    }

    #[test]
    fn test_estimate_tracks_comovement() {
        let history = PriceHistory::new();
        seed(&history, "BTC", &wave(1.0, false));
        seed(&history, "ETH", &wave(1.5, false));
        seed(&history, "GLD", &wave(1.0, true));

        let estimator = CorrelationEstimator::new(&history, 10);

        let with_eth = estimator.estimate("BTC", &[ExistingPosition::new("ETH", dec!(1000))]);
        assert!(with_eth > dec!(0.99));

        let with_gold = estimator.estimate("BTC", &[ExistingPosition::new("GLD", dec!(1000))]);
        assert_eq!(with_gold, Decimal::ZERO);

        let mixed = estimator.estimate(
            "BTC",
            &[
                ExistingPosition::new("ETH", dec!(1000)),
                ExistingPosition::new("GLD", dec!(1000)),
            ],
        );
        assert!(mixed > dec!(0.49) && mixed < dec!(0.51));
    }

    #[test]
    fn test_same_symbol_and_unknown_history() {
        let history = PriceHistory::new();
        let estimator = CorrelationEstimator::new(&history, 10);

        let same = estimator.estimate("BTC", &[ExistingPosition::new("BTC", dec!(500))]);
        assert_eq!(same, Decimal::ONE);

        let unknown = estimator.estimate("BTC", &[ExistingPosition::new("DOGE", dec!(500))]);
        assert_eq!(unknown, Decimal::ZERO);

        assert_eq!(estimator.estimate("BTC", &[]), Decimal::ZERO);
    }
}
