//! Configuration management utilities

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable overriding [`Config::environment`]
pub const ENV_ENVIRONMENT: &str = "FNCALL_ENV";
/// Environment variable overriding [`Config::log_level`]
pub const ENV_LOG_LEVEL: &str = "FNCALL_LOG";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Application name
    pub app_name: String,
    /// Environment (dev, prod, etc.)
    pub environment: String,
    /// Default tracing filter directive, e.g. `info` or `fncall_tools=debug`
    pub log_level: String,
    /// Include the event target in log lines
    pub log_targets: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "fncall".to_string(),
            environment: "development".to_string(),
            log_level: "info".to_string(),
            log_targets: true,
        }
    }
}

impl Config {
    /// Defaults, overridden by `FNCALL_ENV` / `FNCALL_LOG` when set
    pub fn from_env() -> Self {
        Self::default().apply_env()
    }

    /// Load from a JSON file; missing keys take their defaults
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&data)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        Ok(config.apply_env())
    }

    fn apply_env(mut self) -> Self {
        if let Ok(environment) = std::env::var(ENV_ENVIRONMENT) {
            self.environment = environment;
        }
        if let Ok(level) = std::env::var(ENV_LOG_LEVEL) {
            self.log_level = level;
        }
        self
    }
}
