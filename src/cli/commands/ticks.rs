//! Circuit breaker replay command.

use anyhow::Result;
use risk_core::{PriceTick, RiskResult};
use risk_engine::RiskEngine;
use tracing::info;

use super::{print_result, read_json};
use crate::cli::RequestArgs;

pub fn run(engine: &RiskEngine, args: &RequestArgs) -> Result<()> {
    let mut ticks: Vec<PriceTick> = read_json(&args.input)?;
    ticks.sort_by_key(|tick| tick.timestamp);

    let results: RiskResult<Vec<_>> = ticks
        .iter()
        .map(|tick| engine.check_circuit_breaker(tick))
        .collect();

    if let Ok(results) = &results {
        let trips = results.iter().filter(|r| r.triggered).count();
        info!(ticks = results.len(), trips, "Replayed price ticks");
    }

    print_result(results, args.pretty)
}
