//! Configuration provider trait definition.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::RiskResult;

/// Raw name/value mapping served by a provider.
pub type ConfigMap = Map<String, Value>;

/// Source of risk parameters.
///
/// Providers may return partial data; the engine merges whatever is present
/// over its built-in defaults.
#[async_trait]
pub trait ConfigurationProvider: Send + Sync {
    /// Fetch the current parameter mapping.
    async fn get_config(&self) -> RiskResult<ConfigMap>;

    /// Provider name for logging.
    fn name(&self) -> &str {
        "provider"
    }
}

/// Provider that always serves the same mapping.
#[derive(Debug, Clone, Default)]
pub struct StaticConfigProvider {
    values: ConfigMap,
}

impl StaticConfigProvider {
    pub fn new(values: ConfigMap) -> Self {
        Self { values }
    }
}

#[async_trait]
impl ConfigurationProvider for StaticConfigProvider {
    async fn get_config(&self) -> RiskResult<ConfigMap> {
        Ok(self.values.clone())
    }

    fn name(&self) -> &str {
        "static"
    }
}
