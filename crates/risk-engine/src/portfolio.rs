//! Portfolio-level risk aggregation.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

use risk_core::{PortfolioRiskRequest, PortfolioRiskResult, PositionRisk, RiskLevel, RiskResult};

use crate::numeric::{div, mul, percent, sum};

/// Portfolio risk percentage above which the portfolio is high risk.
const HIGH_RISK_PCT: Decimal = dec!(10);
/// Portfolio risk percentage above which the portfolio is medium risk.
const MEDIUM_RISK_PCT: Decimal = dec!(5);
/// Largest risk share a single position may contribute, in percent.
const MAX_POSITION_RISK_SHARE: Decimal = dec!(5);
/// Positions needed before the portfolio counts as diversified.
const MIN_POSITIONS: usize = 3;

/// Aggregates risk across all open positions.
#[derive(Debug, Clone, Copy, Default)]
pub struct PortfolioRiskAssessor;

impl PortfolioRiskAssessor {
    pub fn new() -> Self {
        Self
    }

    /// Assess the whole portfolio.
    pub fn assess(&self, request: &PortfolioRiskRequest) -> RiskResult<PortfolioRiskResult> {
        request.validate()?;

        if request.positions.is_empty() {
            return Ok(PortfolioRiskResult {
                total_risk: Decimal::ZERO,
                portfolio_value: Decimal::ZERO,
                portfolio_risk_percentage: Decimal::ZERO,
                exposure_percentage: Decimal::ZERO,
                risk_level: RiskLevel::Low,
                positions: Vec::new(),
                risk_adjusted_return: None,
                recommendations: Vec::new(),
            });
        }

        let risk_amounts = request
            .positions
            .iter()
            .map(|p| mul(p.value, p.risk, "position risk"))
            .collect::<RiskResult<Vec<_>>>()?;
        let total_value = sum(request.positions.iter().map(|p| p.value), "portfolio value")?;
        let total_risk = sum(risk_amounts.iter().copied(), "portfolio risk")?;

        let pct_of_value = |amount: Decimal| -> RiskResult<Decimal> {
            if total_value.is_zero() {
                Ok(Decimal::ZERO)
            } else {
                Ok(percent(div(amount, total_value, "risk share")?))
            }
        };

        let portfolio_risk_percentage = pct_of_value(total_risk)?;
        let exposure_percentage = percent(div(total_value, request.account_balance, "exposure")?);

        let positions = request
            .positions
            .iter()
            .zip(&risk_amounts)
            .map(|(p, &risk_amount)| {
                Ok(PositionRisk {
                    symbol: p.symbol.clone(),
                    value: p.value,
                    risk_amount,
                    risk_share: pct_of_value(risk_amount)?,
                })
            })
            .collect::<RiskResult<Vec<_>>>()?;

        let risk_level = if portfolio_risk_percentage > HIGH_RISK_PCT {
            RiskLevel::High
        } else if portfolio_risk_percentage > MEDIUM_RISK_PCT {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        };

        let mut recommendations = Vec::new();
        if portfolio_risk_percentage > HIGH_RISK_PCT {
            recommendations.push(format!(
                "Reduce overall exposure: portfolio risk {:.2}% exceeds {}%",
                portfolio_risk_percentage, HIGH_RISK_PCT
            ));
        }
        if request.positions.len() < MIN_POSITIONS {
            recommendations.push(format!(
                "Diversify: only {} position(s) held, at least {} recommended",
                request.positions.len(),
                MIN_POSITIONS
            ));
        }
        for position in positions.iter().filter(|p| p.risk_share > MAX_POSITION_RISK_SHARE) {
            recommendations.push(format!(
                "Reduce {}: contributes {:.2}% of portfolio risk",
                position.symbol, position.risk_share
            ));
        }

        let risk_adjusted_return = self.risk_adjusted_return(request, total_value, total_risk);

        debug!(
            positions = request.positions.len(),
            total_risk = %total_risk,
            risk_pct = %portfolio_risk_percentage,
            risk_level = %risk_level,
            "Portfolio assessed"
        );

        Ok(PortfolioRiskResult {
            total_risk,
            portfolio_value: total_value,
            portfolio_risk_percentage,
            exposure_percentage,
            risk_level,
            positions,
            risk_adjusted_return,
            recommendations,
        })
    }

    /// Excess expected return per unit of value at risk.
    fn risk_adjusted_return(
        &self,
        request: &PortfolioRiskRequest,
        total_value: Decimal,
        total_risk: Decimal,
    ) -> Option<Decimal> {
        if total_value.is_zero() || total_risk.is_zero() {
            return None;
        }

        let weighted = request
            .positions
            .iter()
            .map(|p| p.expected_return.and_then(|r| r.checked_mul(p.value)))
            .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v?))?;

        let expected = weighted.checked_div(total_value)?;
        let risk_fraction = total_risk.checked_div(total_value)?;
        expected
            .checked_sub(request.risk_free_rate)?
            .checked_div(risk_fraction)
    }
}
