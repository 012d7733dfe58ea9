//! Event sink that writes risk events to the log.

use tracing::{info, warn};

use risk_core::{EventSink, RiskEvent};

/// Logs every risk event through `tracing`.
///
/// Guard trips and configuration fallbacks are logged at `warn`, everything
/// else at `info`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl TracingEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for TracingEventSink {
    fn emit(&self, event: RiskEvent) {
        if event.action.is_alert() {
            warn!(
                target: "risk::events",
                event_id = %event.event_id,
                action = %event.action,
                data = %event.data,
                "Risk alert"
            );
        } else {
            info!(
                target: "risk::events",
                event_id = %event.event_id,
                action = %event.action,
                data = %event.data,
                "Risk event"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use risk_core::RiskAction;
    use serde_json::json;

    #[test]
    fn test_emit_without_subscriber() {
        let sink = TracingEventSink::new();
        sink.emit(RiskEvent::new(RiskAction::CircuitBreakerTriggered, json!({ "symbol": "BTC" })));
        sink.emit(RiskEvent::new(RiskAction::RiskAssessed, json!({})));
    }

    #[test]
    fn test_alert_classification() {
        assert!(RiskAction::DrawdownProtectionTriggered.is_alert());
        assert!(RiskAction::ConfigFallback.is_alert());
        assert!(!RiskAction::PositionSizeCalculated.is_alert());
        assert_eq!(RiskAction::ConfigFallback.to_string(), "config_fallback");
    }
}
