//! Error types for the risk engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level risk engine error.
#[derive(Error, Debug)]
pub enum RiskError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration provider timed out after {timeout_ms} ms")]
    ConfigTimeout { timeout_ms: u64 },

    #[error("Guard state error: {0}")]
    GuardState(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RiskError {
    /// Shorthand for an invalid-input error.
    pub fn invalid(message: impl Into<String>) -> Self {
        RiskError::InvalidInput(message.into())
    }
}

/// Explicit error result handed to callers that speak JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl From<&RiskError> for ErrorResponse {
    fn from(err: &RiskError) -> Self {
        Self {
            error: err.to_string(),
        }
    }
}

/// Result type alias for risk operations.
pub type RiskResult<T> = Result<T, RiskError>;
