//! Position sizing algorithms.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

use risk_core::{PositionSizingRequest, PositionSizingResult, RiskConfiguration, RiskResult, SizingMethod};

use crate::numeric::{div, mul, percent, tidy};

/// Position sizer calculates how much capital to commit to a trade.
#[derive(Debug, Clone, Copy)]
pub struct PositionSizer<'a> {
    config: &'a RiskConfiguration,
}

impl<'a> PositionSizer<'a> {
    /// Create a new position sizer over a configuration snapshot.
    pub fn new(config: &'a RiskConfiguration) -> Self {
        Self { config }
    }

    /// Calculate position size.
    ///
    /// Missing method inputs downgrade to `Fixed`; the result records both the
    /// requested and the used method.
    pub fn size(&self, request: &PositionSizingRequest) -> RiskResult<PositionSizingResult> {
        request.validate()?;

        let balance = request.account_balance;
        let max_allowed = self.fixed(balance)?;

        let (method_used, fallback_reason, raw_size) = match request.method {
            SizingMethod::Kelly => match (request.win_rate, request.avg_win, request.avg_loss) {
                (Some(p), Some(win), Some(loss)) => {
                    (SizingMethod::Kelly, None, self.kelly(balance, p, win, loss)?)
                }
                _ => self.fallback("kelly requires win_rate, avg_win and avg_loss", balance)?,
            },

            SizingMethod::OptimalF => match (request.win_rate, request.avg_win, request.avg_loss) {
                (Some(p), Some(win), Some(loss)) => {
                    (SizingMethod::OptimalF, None, self.optimal_f(balance, p, win, loss)?)
                }
                _ => self.fallback("optimal_f requires win_rate, avg_win and avg_loss", balance)?,
            },

            SizingMethod::Volatility => match request.volatility {
                Some(vol) => (SizingMethod::Volatility, None, self.volatility(balance, vol)?),
                None => self.fallback("volatility sizing requires volatility", balance)?,
            },

            SizingMethod::Fixed => (SizingMethod::Fixed, None, max_allowed),
        };

        let position_size = match request.correlation {
            Some(correlation) => {
                let c = correlation.max(Decimal::ZERO).min(Decimal::ONE);
                // Scale is within [0.5, 1], so this never grows the size.
                raw_size * (Decimal::ONE - c / dec!(2))
            }
            None => raw_size,
        };

        let units = div(position_size, request.current_price, "units")?;
        let risk_percentage = percent(div(position_size, balance, "risk percentage")?);

        debug!(
            symbol = %request.symbol,
            requested = %request.method,
            used = %method_used,
            position_size = %position_size,
            "Position sized"
        );

        Ok(PositionSizingResult {
            symbol: request.symbol.clone(),
            position_size: tidy(position_size, 8),
            units: tidy(units, 8),
            method_requested: request.method,
            method_used,
            fallback_reason,
            risk_percentage: tidy(risk_percentage, 8),
            max_allowed: tidy(max_allowed, 8),
        })
    }

    fn fallback(&self, reason: &str, balance: Decimal) -> RiskResult<(SizingMethod, Option<String>, Decimal)> {
        debug!(reason, "Falling back to fixed sizing");
        Ok((SizingMethod::Fixed, Some(reason.to_string()), self.fixed(balance)?))
    }

    /// Scale a fraction of the account into [0, balance * max_position_size].
    fn cap(&self, fraction: Decimal, balance: Decimal) -> RiskResult<Decimal> {
        if fraction <= Decimal::ZERO {
            return Ok(Decimal::ZERO);
        }
        let fraction = fraction.min(self.config.max_position_size);
        mul(balance, fraction, "position size")
    }

    fn fixed(&self, balance: Decimal) -> RiskResult<Decimal> {
        mul(balance, self.config.max_position_size, "maximum position")
    }

    fn kelly(&self, balance: Decimal, win_rate: Decimal, avg_win: Decimal, avg_loss: Decimal) -> RiskResult<Decimal> {
        let (avg_win, avg_loss) = (avg_win.abs(), avg_loss.abs());
        if avg_loss.is_zero() || avg_win.is_zero() {
            return Ok(Decimal::ZERO);
        }

        // f* = (b*p - q) / b with b = avg_win / avg_loss, i.e. p - q / b
        let fraction = match edge(win_rate, avg_win, avg_loss) {
            Some(kelly) => kelly.saturating_mul(self.config.kelly_fraction),
            None => return Ok(Decimal::ZERO),
        };

        self.cap(fraction, balance)
    }

    fn optimal_f(&self, balance: Decimal, win_rate: Decimal, avg_win: Decimal, avg_loss: Decimal) -> RiskResult<Decimal> {
        let (avg_win, avg_loss) = (avg_win.abs(), avg_loss.abs());
        if avg_win.is_zero() {
            return Ok(Decimal::ZERO);
        }

        // f = (p*win - q*loss) / win
        let fraction = match edge(win_rate, avg_win, avg_loss) {
            Some(f) => f.saturating_mul(self.config.kelly_fraction),
            None => return Ok(Decimal::ZERO),
        };

        self.cap(fraction, balance)
    }

    fn volatility(&self, balance: Decimal, volatility: Decimal) -> RiskResult<Decimal> {
        let clamped = volatility
            .max(self.config.min_volatility)
            .min(self.config.max_volatility);
        let factor = div(
            Decimal::ONE,
            mul(clamped, self.config.volatility_multiplier, "volatility scale")?,
            "volatility factor",
        )?;

        self.cap(factor.saturating_mul(self.config.max_position_size), balance)
    }
}

/// `p - (1 - p) * loss / win`, or `None` when the loss/win ratio overflows,
/// which means the edge is hopelessly negative.
fn edge(win_rate: Decimal, avg_win: Decimal, avg_loss: Decimal) -> Option<Decimal> {
    let ratio = avg_loss.checked_div(avg_win)?;
    let q = Decimal::ONE - win_rate;
    Some(win_rate - q.checked_mul(ratio)?)
}
