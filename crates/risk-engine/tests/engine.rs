use std::sync::Arc;
use std::thread;

use chrono::{Duration, TimeZone, Utc};
use risk_core::{
    ChannelEventSink, CircuitPhase, DailyLossRequest, DrawdownRequest, ExistingPosition, GuardAction,
    MemoryEventSink, PortfolioPosition, PortfolioRiskRequest, PositionSizingRequest, PriceTick,
    RiskAction, RiskAssessmentRequest, RiskConfiguration, RiskLevel, Side, SizingMethod,
    StopLossMethod, StopLossRequest,
};
use risk_engine::{RiskEngine, DECISION_HISTORY_CAP};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn assessment(symbol: &str, position_size: Decimal) -> RiskAssessmentRequest {
    RiskAssessmentRequest {
        symbol: symbol.to_string(),
        position_size,
        entry_price: dec!(50000),
        current_price: dec!(50000),
        side: Side::Buy,
        account_balance: dec!(10000),
        stop_loss: Some(dec!(48000)),
        take_profit: Some(dec!(55000)),
        existing_positions: Vec::new(),
    }
}

#[test]
fn test_trade_lifecycle() {
    let sink = Arc::new(MemoryEventSink::new());
    let engine = RiskEngine::default().with_sink(sink.clone());

    let sizing = PositionSizingRequest::new("BTC", Side::Buy, dec!(10000), dec!(50000), SizingMethod::Kelly)
        .with_trade_stats(dec!(0.6), dec!(0.05), dec!(0.03));
    let size = engine.calculate_position_size(&sizing).unwrap();
    assert!(size.position_size > dec!(899) && size.position_size < dec!(901));

    let stop = engine
        .calculate_stop_loss(&StopLossRequest::new("BTC", dec!(50000), Side::Buy))
        .unwrap();
    assert_eq!(stop.method, StopLossMethod::Default);
    assert_eq!(stop.stop_loss, dec!(49000));

    let mut request = assessment("BTC", size.position_size);
    request.stop_loss = Some(stop.stop_loss);
    let verdict = engine.assess_risk(&request).unwrap();
    assert_eq!(verdict.risk_level, RiskLevel::Low);
    assert!(verdict.approved);

    let actions: Vec<RiskAction> = sink.events().into_iter().map(|e| e.action).collect();
    assert_eq!(
        actions,
        vec![
            RiskAction::PositionSizeCalculated,
            RiskAction::StopLossCalculated,
            RiskAction::RiskAssessed,
        ]
    );
}

#[test]
fn test_portfolio_assessment_event() {
    let sink = Arc::new(MemoryEventSink::new());
    let engine = RiskEngine::default().with_sink(sink.clone());

    let request = PortfolioRiskRequest {
        positions: vec![
            PortfolioPosition::new("BTC", dec!(5000), dec!(0.02)),
            PortfolioPosition::new("ETH", dec!(3000), dec!(0.03)),
        ],
        account_balance: dec!(10000),
        risk_free_rate: Decimal::ZERO,
    };
    let result = engine.assess_portfolio_risk(&request).unwrap();

    assert_eq!(result.total_risk, dec!(190));
    // 190 at risk on 8000 of positions
    assert_eq!(result.portfolio_risk_percentage, dec!(2.375));
    assert_eq!(sink.with_action(RiskAction::PortfolioRiskAssessed).len(), 1);
}

#[test]
fn test_circuit_breaker_cooldown_cycle() {
    let engine = RiskEngine::default();
    let t0 = Utc.timestamp_opt(1_700_000_000, 0).unwrap();

    let tripped = engine
        .check_circuit_breaker(&PriceTick::new("BTC", dec!(100), dec!(112), t0))
        .unwrap();
    assert!(tripped.triggered);
    assert_eq!(tripped.price_change, dec!(0.12));

    let cooling = engine
        .check_circuit_breaker(&PriceTick::new("BTC", dec!(112), dec!(130), t0 + Duration::seconds(60)))
        .unwrap();
    assert!(!cooling.triggered);
    assert_eq!(cooling.state, CircuitPhase::Cooldown);
    assert_eq!(cooling.cooldown_remaining, Some(240));

    let rearmed = engine
        .check_circuit_breaker(&PriceTick::new("BTC", dec!(130), dec!(150), t0 + Duration::seconds(301)))
        .unwrap();
    assert!(rearmed.triggered);
}

#[test]
fn test_concurrent_ticks_trigger_once() {
    let sink = Arc::new(MemoryEventSink::new());
    let engine = Arc::new(RiskEngine::default().with_sink(sink.clone()));
    let t0 = Utc.timestamp_opt(1_700_000_000, 0).unwrap();

    let triggered: usize = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let engine = Arc::clone(&engine);
                scope.spawn(move || {
                    engine
                        .check_circuit_breaker(&PriceTick::new("BTC", dec!(100), dec!(120), t0))
                        .map(|r| r.triggered)
                        .unwrap_or(false)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap_or(false))
            .filter(|&t| t)
            .count()
    });

    assert_eq!(triggered, 1);
    assert_eq!(sink.with_action(RiskAction::CircuitBreakerTriggered).len(), 1);
}

#[test]
fn test_symbols_are_isolated() {
    let engine = RiskEngine::default();
    let t0 = Utc.timestamp_opt(1_700_000_000, 0).unwrap();

    engine
        .check_circuit_breaker(&PriceTick::new("BTC", dec!(100), dec!(120), t0))
        .unwrap();
    let eth = engine
        .check_circuit_breaker(&PriceTick::new("ETH", dec!(100), dec!(120), t0))
        .unwrap();

    assert!(eth.triggered);
}

#[test]
fn test_drawdown_and_daily_loss_events() {
    let sink = Arc::new(MemoryEventSink::new());
    let engine = RiskEngine::default().with_sink(sink.clone());
    let t0 = Utc.timestamp_opt(1_700_000_000, 0).unwrap();

    let calm = engine.check_drawdown(&DrawdownRequest::new(dec!(10000), t0)).unwrap();
    assert_eq!(calm.action, GuardAction::ContinueTrading);

    let deep = engine
        .check_drawdown(&DrawdownRequest::new(dec!(7500), t0 + Duration::minutes(5)))
        .unwrap();
    assert_eq!(deep.action, GuardAction::StopTrading);

    let daily = engine
        .check_daily_loss(&DailyLossRequest::new(dec!(9600), t0).with_day_start(dec!(10000)))
        .unwrap();
    assert_eq!(daily.action, GuardAction::ReducePositionSizes);

    assert_eq!(sink.with_action(RiskAction::DrawdownProtectionTriggered).len(), 1);
    assert_eq!(sink.with_action(RiskAction::DailyLossProtectionTriggered).len(), 1);
}

#[test]
fn test_decision_history_is_bounded() {
    let engine = RiskEngine::default();

    for i in 0..(DECISION_HISTORY_CAP + 5) {
        engine
            .assess_risk(&assessment(&format!("SYM{}", i), dec!(1000)))
            .unwrap();
    }

    let decisions = engine.recent_assessments();
    assert_eq!(decisions.len(), DECISION_HISTORY_CAP);
    assert_eq!(decisions[0].symbol, "SYM5");
}

#[test]
fn test_recorded_prices_feed_correlation() {
    let config = RiskConfiguration {
        correlation_min_samples: 3,
        ..RiskConfiguration::default()
    };
    let engine = RiskEngine::new(config);

    for price in [dec!(100), dec!(102), dec!(101), dec!(105), dec!(108), dec!(107)] {
        engine.record_price("BTC", price);
        engine.record_price("WBTC", price * dec!(2));
    }

    let mut request = assessment("BTC", dec!(1000));
    request.existing_positions = vec![ExistingPosition::new("WBTC", dec!(2000))];
    let result = engine.assess_risk(&request).unwrap();

    assert!(result.correlation_risk > dec!(0.99));
    assert!(result
        .recommendations
        .iter()
        .any(|r| r.starts_with("Diversify")));
}

#[tokio::test]
async fn test_channel_sink_delivers_events() {
    let (sink, mut events) = ChannelEventSink::channel();
    let engine = RiskEngine::default().with_sink(Arc::new(sink));

    let request = PositionSizingRequest::new("BTC", Side::Sell, dec!(10000), dec!(100), SizingMethod::Fixed);
    engine.calculate_position_size(&request).unwrap();

    let event = events.recv().await.unwrap();
    assert_eq!(event.action, RiskAction::PositionSizeCalculated);
    assert_eq!(event.data["symbol"], "BTC");
}

#[test]
fn test_extreme_inputs_return_instead_of_panicking() {
    let engine = RiskEngine::default();
    let tiny = dec!(0.0000000000000000000000000001);

    let sizing = PositionSizingRequest::new("BTC", Side::Buy, dec!(10000), dec!(100), SizingMethod::Kelly)
        .with_trade_stats(dec!(0.6), dec!(100), tiny);
    assert!(engine.calculate_position_size(&sizing).is_ok());

    let t0 = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    let tick = engine
        .check_circuit_breaker(&PriceTick::new("DUST", tiny, dec!(1000), t0))
        .unwrap();
    assert!(tick.triggered);

    let mut request = assessment("BTC", Decimal::MAX);
    request.account_balance = tiny;
    assert!(engine.assess_risk(&request).is_err());

    let portfolio = PortfolioRiskRequest {
        positions: vec![
            PortfolioPosition::new("BTC", Decimal::MAX, dec!(0.02)),
            PortfolioPosition::new("ETH", Decimal::MAX, dec!(0.02)),
        ],
        account_balance: dec!(10000),
        risk_free_rate: Decimal::ZERO,
    };
    assert!(engine.assess_portfolio_risk(&portfolio).is_err());
}
