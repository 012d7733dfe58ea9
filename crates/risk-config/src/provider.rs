//! File-backed configuration provider.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use risk_core::{ConfigMap, ConfigurationProvider, RiskError, RiskResult};

/// Reads risk parameters from a JSON or TOML file on every fetch.
///
/// JSON files hold a flat object of parameters, optionally as
/// `{"value": x}` records. TOML files may either be flat or keep the
/// parameters under a `[risk]` table, as in the application config.
#[derive(Debug, Clone)]
pub struct FileConfigProvider {
    path: PathBuf,
}

impl FileConfigProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_toml(&self) -> bool {
        self.path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
    }

    fn parse(&self, contents: &str) -> RiskResult<ConfigMap> {
        let value: Value = if self.is_toml() {
            let table: toml::Table = toml::from_str(contents)
                .map_err(|e| RiskError::Config(format!("{}: {}", self.path.display(), e)))?;
            serde_json::to_value(table)?
        } else {
            serde_json::from_str(contents)?
        };

        let mut map = match value {
            Value::Object(map) => map,
            _ => {
                return Err(RiskError::Config(format!(
                    "{}: expected a table of risk parameters",
                    self.path.display()
                )))
            }
        };

        if let Some(Value::Object(risk)) = map.remove("risk") {
            return Ok(risk);
        }
        Ok(map)
    }
}

#[async_trait]
impl ConfigurationProvider for FileConfigProvider {
    async fn get_config(&self) -> RiskResult<ConfigMap> {
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| RiskError::Config(format!("{}: {}", self.path.display(), e)))?;

        let values = self.parse(&contents)?;
        debug!(path = %self.path.display(), keys = values.len(), "Loaded risk parameters");
        Ok(values)
    }

    fn name(&self) -> &str {
        "file"
    }
}
