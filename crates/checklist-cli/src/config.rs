//! CLI configuration file
//!
//! ```toml
//! [service]
//! cache_capacity = 500
//! cache_ttl_secs = 60
//!
//! [compile]
//! currency = "NOK"
//! include_gallery = false
//! ```

use anyhow::Context;
use checklist_report::CompileOptions;
use checklist_store::ServiceConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Contents of a `--config` file; every table is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub service: ServiceConfig,
    pub compile: CompileOptions,
}

impl CliConfig {
    /// Parse a TOML document
    ///
    /// # Errors
    /// Malformed TOML or mistyped values
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        toml::from_str(content).context("invalid configuration")
    }

    /// Load from `path`, or defaults when no path is given
    ///
    /// # Errors
    /// Unreadable file or invalid TOML
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("in {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_tables_fall_back_to_defaults() {
        let config = CliConfig::from_toml("[compile]\ncurrency = \"NOK\"\n").unwrap();
        assert_eq!(config.service, ServiceConfig::default());
        assert_eq!(config.compile.currency, "NOK");
        assert!(config.compile.include_gallery);
    }

    #[test]
    fn service_table_is_read() {
        let config = CliConfig::from_toml("[service]\ncache_ttl_secs = 60\nlock_finalized = false\n").unwrap();
        assert_eq!(config.service.cache_ttl_secs, 60);
        assert_eq!(config.service.cache_capacity, 1000);
        assert!(!config.service.lock_finalized);
    }

    #[test]
    fn no_path_means_defaults() {
        assert_eq!(CliConfig::load(None).unwrap(), CliConfig::default());
    }

    #[test]
    fn file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checklist.toml");
        std::fs::write(&path, "[compile]\ninclude_gallery = false\n").unwrap();
        let config = CliConfig::load(Some(&path)).unwrap();
        assert!(!config.compile.include_gallery);
    }

    #[test]
    fn bad_value_is_an_error() {
        assert!(CliConfig::from_toml("[service]\ncache_capacity = \"many\"\n").is_err());
    }
}
