//! Logging setup and event reporting.

mod events;
mod logging;

pub use events::TracingEventSink;
pub use logging::setup_logging;
