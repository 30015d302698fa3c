//! Engine configuration

use crate::catalog::DocSource;
use crate::deriver::{DEFAULT_MAX_DEPTH, SchemaDeriver};
use crate::error::{Result, ToolError};
use crate::verify::Verification;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding [`EngineConfig::tools_dir`]
pub const ENV_TOOLS_DIR: &str = "FNCALL_TOOLS_DIR";
/// Environment variable overriding [`EngineConfig::verification`]
pub const ENV_VERIFY: &str = "FNCALL_VERIFY";

/// Settings for derivation and persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory persisted tools are stored in
    pub tools_dir: PathBuf,
    /// How loaded tools are checked against their callables
    pub verification: Verification,
    /// Nesting limit for schema derivation
    pub max_depth: usize,
    /// Mark derived tools as strict for providers that support it
    pub strict: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tools_dir: PathBuf::from("tools"),
            verification: Verification::Deep,
            max_depth: DEFAULT_MAX_DEPTH,
            strict: false,
        }
    }
}

impl EngineConfig {
    /// Defaults, overridden by `FNCALL_TOOLS_DIR` / `FNCALL_VERIFY` when set
    pub fn from_env() -> Result<Self> {
        Self::default().apply_vars(|key| std::env::var(key).ok())
    }

    /// Load from a JSON file; missing keys take their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|e| ToolError::io(path, e))?;
        let config: Self = serde_json::from_str(&data)
            .map_err(|e| ToolError::Config(format!("invalid config {}: {e}", path.display())))?;
        config.validate()?;
        config.apply_vars(|key| std::env::var(key).ok())
    }

    /// A deriver honouring `max_depth` and `strict`
    pub fn deriver(&self, docs: impl DocSource + 'static) -> SchemaDeriver {
        SchemaDeriver::new(docs)
            .with_max_depth(self.max_depth)
            .with_strict(self.strict)
    }

    fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(ToolError::Config("max_depth must be at least 1".to_string()));
        }
        Ok(())
    }

    fn apply_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(dir) = var(ENV_TOOLS_DIR) {
            self.tools_dir = PathBuf::from(dir);
        }
        if let Some(level) = var(ENV_VERIFY) {
            self.verification = level.parse()?;
        }
        Ok(self)
    }
}
