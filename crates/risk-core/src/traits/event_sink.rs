//! Event sink trait definition.

use std::sync::Mutex;

use tokio::sync::mpsc;

use crate::types::{RiskAction, RiskEvent};

/// Consumer of risk events.
///
/// `emit` is called on the engine's hot path and must not block.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: RiskEvent);
}

/// Sink that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn emit(&self, _event: RiskEvent) {}
}

/// Sink that keeps every event in memory.
#[derive(Debug, Default)]
pub struct MemoryEventSink {
    events: Mutex<Vec<RiskEvent>>,
}

impl MemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far.
    pub fn events(&self) -> Vec<RiskEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Events with the given action.
    pub fn with_action(&self, action: RiskAction) -> Vec<RiskEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.action == action)
            .collect()
    }
}

impl EventSink for MemoryEventSink {
    fn emit(&self, event: RiskEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}

/// Sink that forwards events over an unbounded tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelEventSink {
    sender: mpsc::UnboundedSender<RiskEvent>,
}

impl ChannelEventSink {
    /// Create a sink and the receiver that drains it.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<RiskEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: RiskEvent) {
        // A closed receiver just means nobody is listening any more.
        let _ = self.sender.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_memory_sink_filters_by_action() {
        let sink = MemoryEventSink::new();
        sink.emit(RiskEvent::new(RiskAction::RiskAssessed, json!({})));
        sink.emit(RiskEvent::new(RiskAction::CircuitBreakerTriggered, json!({})));

        assert_eq!(sink.events().len(), 2);
        assert_eq!(sink.with_action(RiskAction::RiskAssessed).len(), 1);
    }

    #[tokio::test]
    async fn test_channel_sink_delivers() {
        let (sink, mut rx) = ChannelEventSink::channel();
        sink.emit(RiskEvent::new(RiskAction::PositionSizeCalculated, json!({ "size": 1 })));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.action, RiskAction::PositionSizeCalculated);
    }
}
