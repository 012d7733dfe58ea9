//! Stop-loss placement.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

use risk_core::{RiskConfiguration, RiskResult, Side, StopLossMethod, StopLossRequest, StopLossResult};

use crate::numeric::{add, div, mul};

/// ATR multiplier used when a volatility stop omits one.
const DEFAULT_ATR_MULTIPLIER: Decimal = dec!(2);

/// Largest distance a long stop may sit below entry.
const MAX_LONG_DISTANCE: Decimal = dec!(0.99);

/// Stop-loss calculator.
#[derive(Debug, Clone, Copy)]
pub struct StopLossCalculator<'a> {
    config: &'a RiskConfiguration,
}

impl<'a> StopLossCalculator<'a> {
    /// Create a new calculator over a configuration snapshot.
    pub fn new(config: &'a RiskConfiguration) -> Self {
        Self { config }
    }

    /// Calculate the stop price for a new position.
    ///
    /// An explicit percentage wins over volatility, which wins over the
    /// configured default.
    pub fn calculate(&self, request: &StopLossRequest) -> RiskResult<StopLossResult> {
        request.validate()?;

        let (distance, method) = self.distance(request)?;
        let distance = match request.side {
            Side::Buy => distance.min(MAX_LONG_DISTANCE),
            Side::Sell => distance,
        };

        let entry = request.entry_price;
        let stop_loss = match request.side {
            Side::Buy => mul(entry, Decimal::ONE - distance, "stop price")?, // Long: stop below
            Side::Sell => mul(entry, add(Decimal::ONE, distance, "stop distance")?, "stop price")?, // Short: stop above
        };
        let stop_distance = div((stop_loss - entry).abs(), entry, "stop distance")?;

        debug!(
            symbol = %request.symbol,
            side = %request.side,
            stop_loss = %stop_loss,
            method = ?method,
            "Stop-loss calculated"
        );

        Ok(StopLossResult {
            symbol: request.symbol.clone(),
            stop_loss,
            stop_distance,
            method,
        })
    }

    fn distance(&self, request: &StopLossRequest) -> RiskResult<(Decimal, StopLossMethod)> {
        if let Some(pct) = request.percentage.filter(|p| *p > Decimal::ZERO) {
            return Ok((pct, StopLossMethod::Percentage));
        }

        if let Some(vol) = request.volatility.filter(|v| *v > Decimal::ZERO) {
            let multiplier = request
                .atr_multiplier
                .filter(|m| *m > Decimal::ZERO)
                .unwrap_or(DEFAULT_ATR_MULTIPLIER);
            return Ok((mul(vol, multiplier, "volatility stop distance")?, StopLossMethod::Volatility));
        }

        Ok((self.config.stop_loss_default, StopLossMethod::Default))
    }
}
