//! Single-trade risk assessment.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

use risk_core::{
    RiskAssessmentRequest, RiskAssessmentResult, RiskConfiguration, RiskLevel, RiskResult, Side,
};

use crate::numeric::{div, mul, percent, sub};
use crate::CorrelationEstimator;

/// Minimum acceptable reward per unit of risk.
const MIN_RISK_REWARD: Decimal = dec!(2);

/// Judges one proposed trade against the configured limits.
#[derive(Debug, Clone, Copy)]
pub struct RiskAssessor<'a> {
    config: &'a RiskConfiguration,
    correlation: CorrelationEstimator<'a>,
}

impl<'a> RiskAssessor<'a> {
    pub fn new(config: &'a RiskConfiguration, correlation: CorrelationEstimator<'a>) -> Self {
        Self {
            config,
            correlation,
        }
    }

    /// Assess a proposed trade.
    pub fn assess(&self, request: &RiskAssessmentRequest) -> RiskResult<RiskAssessmentResult> {
        request.validate()?;

        let entry = request.entry_price;
        let distance = |level: Decimal, what: &str| -> RiskResult<Decimal> {
            div(sub(entry, level, what)?.abs(), entry, what)
        };
        let potential_loss = match request.stop_loss {
            Some(stop) => distance(stop, "potential loss")?,
            None => self.config.stop_loss_default,
        };
        let potential_profit = match request.take_profit {
            Some(target) => distance(target, "potential profit")?,
            None => self.config.take_profit_default,
        };

        let risk_reward_ratio = if potential_loss.is_zero() {
            Decimal::ZERO
        } else {
            div(potential_profit, potential_loss, "risk/reward ratio")?
        };

        let portfolio_risk = div(
            mul(request.position_size, potential_loss, "amount at risk")?,
            request.account_balance,
            "portfolio risk",
        )?;

        let correlation_risk = if request.existing_positions.is_empty() {
            Decimal::ZERO
        } else {
            self.correlation
                .estimate(&request.symbol, &request.existing_positions)
        };

        let max_risk = self.config.max_portfolio_risk;
        let risk_level = if portfolio_risk > max_risk {
            RiskLevel::High
        } else if portfolio_risk > max_risk / dec!(2) {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        };

        let mut recommendations = Vec::new();
        if portfolio_risk > max_risk {
            recommendations.push(format!(
                "Reduce position size: trade risks {:.2}% of the account, limit is {:.2}%",
                percent(portfolio_risk),
                percent(max_risk)
            ));
        }
        if risk_reward_ratio < MIN_RISK_REWARD {
            recommendations.push(format!(
                "Improve risk/reward ratio: {:.2} is below {:.2}",
                risk_reward_ratio, MIN_RISK_REWARD
            ));
        }
        if correlation_risk > self.config.correlation_threshold {
            recommendations.push(format!(
                "Diversify: correlation with existing positions {:.2} exceeds {:.2}",
                correlation_risk, self.config.correlation_threshold
            ));
        }
        if let Some(stop) = request.stop_loss {
            let wrong_side = match request.side {
                Side::Buy => stop >= entry,
                Side::Sell => stop <= entry,
            };
            if wrong_side {
                recommendations.push(format!(
                    "Move stop loss: {} is on the wrong side of entry {} for a {} trade",
                    stop, entry, request.side
                ));
            }
        }

        let unrealized_return = request.side.sign() * div(sub(request.current_price, entry, "unrealized return")?, entry, "unrealized return")?;
        let approved = portfolio_risk <= max_risk;

        debug!(
            symbol = %request.symbol,
            portfolio_risk = %portfolio_risk,
            risk_level = %risk_level,
            approved,
            "Trade assessed"
        );

        Ok(RiskAssessmentResult {
            symbol: request.symbol.clone(),
            risk_level,
            portfolio_risk,
            potential_loss,
            potential_profit,
            risk_reward_ratio,
            correlation_risk,
            unrealized_return,
            recommendations,
            approved,
        })
    }
}
