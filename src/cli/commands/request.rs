//! Single-request commands.

use anyhow::Result;
use risk_core::{PortfolioRiskRequest, PositionSizingRequest, RiskAssessmentRequest, StopLossRequest};
use risk_engine::RiskEngine;
use tracing::debug;

use super::{print_result, read_json};
use crate::cli::RequestArgs;

pub fn size(engine: &RiskEngine, args: &RequestArgs) -> Result<()> {
    let request: PositionSizingRequest = read_json(&args.input)?;
    debug!(symbol = %request.symbol, method = %request.method, "Sizing position");
    print_result(engine.calculate_position_size(&request), args.pretty)
}

pub fn assess(engine: &RiskEngine, args: &RequestArgs) -> Result<()> {
    let request: RiskAssessmentRequest = read_json(&args.input)?;
    debug!(symbol = %request.symbol, "Assessing trade");
    print_result(engine.assess_risk(&request), args.pretty)
}

pub fn stop_loss(engine: &RiskEngine, args: &RequestArgs) -> Result<()> {
    let request: StopLossRequest = read_json(&args.input)?;
    debug!(symbol = %request.symbol, side = %request.side, "Placing stop");
    print_result(engine.calculate_stop_loss(&request), args.pretty)
}

pub fn portfolio(engine: &RiskEngine, args: &RequestArgs) -> Result<()> {
    let request: PortfolioRiskRequest = read_json(&args.input)?;
    debug!(positions = request.positions.len(), "Assessing portfolio");
    print_result(engine.assess_portfolio_risk(&request), args.pretty)
}
