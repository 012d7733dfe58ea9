//! Core types and traits for the risk engine.
//!
//! This crate provides the foundational building blocks including:
//! - Request and result types for sizing, assessment and stop-loss placement
//! - Guard inputs and decisions for circuit breakers, drawdown and daily loss
//! - The typed `RiskConfiguration` and its defaults
//! - Collaborator traits for configuration providers and event sinks

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::{ConfigMerge, RiskConfiguration};
pub use error::{ErrorResponse, RiskError, RiskResult};
pub use traits::*;
pub use types::*;
