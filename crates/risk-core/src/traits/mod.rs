//! Collaborator traits for the risk engine.

mod config_provider;
mod event_sink;

pub use config_provider::{ConfigMap, ConfigurationProvider, StaticConfigProvider};
pub use event_sink::{ChannelEventSink, EventSink, MemoryEventSink, NullEventSink};
