//! Configuration file
//!
//! A single JSON object. Every field has a default except `data_dir`, which
//! the file backend requires.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::errors::{CliError, CliResult};
use crate::documents::UserProfile;
use crate::http_server::HttpServerConfig;
use crate::versioning::HistoryLimits;

/// Where version records live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    #[default]
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory (required for the file backend)
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    #[serde(default)]
    pub storage: StorageBackend,

    #[serde(default)]
    pub http: HttpServerConfig,

    #[serde(default)]
    pub history: HistoryLimits,

    /// `tracing` filter directive, overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[serde(default)]
    pub log_json: bool,

    /// Seed for the author directory
    #[serde(default)]
    pub users: Vec<UserProfile>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            storage: StorageBackend::default(),
            http: HttpServerConfig::default(),
            history: HistoryLimits::default(),
            log_level: default_log_level(),
            log_json: false,
            users: Vec::new(),
        }
    }
}

impl Config {
    /// Load and validate configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::Config(format!("Failed to read config: {}", e)))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> CliResult<Self> {
        let config: Config = serde_json::from_str(content)
            .map_err(|e| CliError::Config(format!("Invalid config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CliResult<()> {
        if self.history.default_limit == 0 {
            return Err(CliError::Config("history.default_limit must be > 0".into()));
        }

        if self.history.max_limit == 0 {
            return Err(CliError::Config("history.max_limit must be > 0".into()));
        }

        if self.history.default_limit > self.history.max_limit {
            return Err(CliError::Config(format!(
                "history.default_limit ({}) exceeds history.max_limit ({})",
                self.history.default_limit, self.history.max_limit
            )));
        }

        if self.storage == StorageBackend::File && self.data_dir.is_none() {
            return Err(CliError::Config(
                "data_dir is required when storage is \"file\"".into(),
            ));
        }

        Ok(())
    }

    /// Data directory; a config error when unset.
    pub fn data_path(&self) -> CliResult<&Path> {
        self.data_dir
            .as_deref()
            .ok_or_else(|| CliError::Config("data_dir is not set".into()))
    }
}
