//! Engine configuration.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Configuration for a [`MessageProcessor`](crate::MessageProcessor).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Maximum nesting depth of a single tree build. Components past this
    /// depth resolve to absent.
    pub max_depth: usize,
    /// Strip the leading `/item`, `/text` and `/label` segments from binding
    /// paths inside template contexts.
    pub legacy_path_prefixes: bool,
    /// Path used by data model updates that carry no explicit path.
    pub default_data_path: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: 256,
            legacy_path_prefixes: true,
            default_data_path: "/".to_string(),
        }
    }
}

impl EngineConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum build depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Enable or disable the legacy path prefix shim.
    pub fn with_legacy_path_prefixes(mut self, enabled: bool) -> Self {
        self.legacy_path_prefixes = enabled;
        self
    }

    /// Set the default data model update path.
    pub fn with_default_data_path(mut self, path: impl Into<String>) -> Self {
        self.default_data_path = path.into();
        self
    }

    /// Parse and validate a configuration from JSON. Missing fields take
    /// their default values.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(Error::config("maxDepth must be at least 1"));
        }
        if !self.default_data_path.starts_with('/') {
            return Err(Error::config(format!(
                "defaultDataPath must be absolute, got '{}'",
                self.default_data_path
            )));
        }
        Ok(())
    }
}
