//! Cached configuration with safe fallback.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use serde::Serialize;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use risk_core::{ConfigurationProvider, RiskConfiguration, RiskError};

/// Default time allowed for a provider fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_millis(500);

/// Outcome of a configuration refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfigRefresh {
    /// True when a new snapshot replaced the previous one
    pub applied: bool,
    /// Known keys whose values were unusable
    pub rejected: Vec<String>,
    /// Keys the engine does not recognise
    pub ignored: Vec<String>,
    /// Why the provider's data could not be used at all
    pub error: Option<String>,
}

impl ConfigRefresh {
    /// True when any part of the provider's data was not used.
    pub fn is_fallback(&self) -> bool {
        !self.applied || !self.rejected.is_empty()
    }
}

/// Holds the current configuration snapshot.
///
/// Readers take an `Arc` so one engine call always sees a single, unchanging
/// snapshot even if a refresh lands mid-call.
#[derive(Debug)]
pub struct ConfigCache {
    current: RwLock<Arc<RiskConfiguration>>,
    fetch_timeout: Duration,
}

impl Default for ConfigCache {
    fn default() -> Self {
        Self::new(RiskConfiguration::default())
    }
}

impl ConfigCache {
    pub fn new(config: RiskConfiguration) -> Self {
        Self {
            current: RwLock::new(Arc::new(config)),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Arc<RiskConfiguration> {
        match self.current.read() {
            Ok(current) => Arc::clone(&current),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Replace the snapshot after validating it.
    pub fn replace(&self, config: RiskConfiguration) -> Result<(), RiskError> {
        config.validate()?;
        let mut current = match self.current.write() {
            Ok(current) => current,
            Err(poisoned) => poisoned.into_inner(),
        };
        *current = Arc::new(config);
        Ok(())
    }

    /// Fetch from a provider and swap in the result.
    ///
    /// On timeout, provider failure or invalid data the previous snapshot is
    /// kept.
    pub async fn refresh(&self, provider: &dyn ConfigurationProvider) -> ConfigRefresh {
        let fetched = match timeout(self.fetch_timeout, provider.get_config()).await {
            Ok(result) => result,
            Err(_) => Err(RiskError::ConfigTimeout {
                timeout_ms: self.fetch_timeout.as_millis() as u64,
            }),
        };

        let merged = fetched.and_then(|values| RiskConfiguration::from_map(&values));
        let merge = match merged {
            Ok(merge) => merge,
            Err(err) => {
                warn!(provider = provider.name(), error = %err, "Keeping previous risk configuration");
                return ConfigRefresh {
                    error: Some(err.to_string()),
                    ..Default::default()
                };
            }
        };

        if !merge.ignored.is_empty() {
            debug!(provider = provider.name(), keys = ?merge.ignored, "Ignoring unknown configuration keys");
        }
        if !merge.rejected.is_empty() {
            warn!(provider = provider.name(), keys = ?merge.rejected, "Defaults kept for unparsable keys");
        }

        if let Err(err) = self.replace(merge.config) {
            warn!(provider = provider.name(), error = %err, "Keeping previous risk configuration");
            return ConfigRefresh {
                error: Some(err.to_string()),
                ..Default::default()
            };
        }
        info!(provider = provider.name(), "Risk configuration refreshed");

        ConfigRefresh {
            applied: true,
            rejected: merge.rejected,
            ignored: merge.ignored,
            error: None,
        }
    }
}
