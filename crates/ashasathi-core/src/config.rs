//! Store configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Slot prefix used by the field app.
pub const DEFAULT_NAMESPACE: &str = "ashasathi";

/// Total push attempts per record before the sync run gives up on it.
pub const DEFAULT_SYNC_MAX_ATTEMPTS: u32 = 3;

pub const ENV_NAMESPACE: &str = "ASHASATHI_NAMESPACE";
pub const ENV_DB_PATH: &str = "ASHASATHI_DB_PATH";
pub const ENV_SYNC_MAX_ATTEMPTS: &str = "ASHASATHI_SYNC_MAX_ATTEMPTS";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Sync run settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub max_attempts: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_SYNC_MAX_ATTEMPTS,
        }
    }
}

/// Where and under which slot names records are kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Prefix for the `{namespace}_patients` / `{namespace}_visits` slots
    pub namespace: String,
    /// SQLite file; `None` keeps everything in memory
    pub database_path: Option<PathBuf>,
    pub sync: SyncConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            database_path: None,
            sync: SyncConfig::default(),
        }
    }
}

impl StoreConfig {
    /// Defaults overridden by `ASHASATHI_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(namespace) = lookup(ENV_NAMESPACE).filter(|s| !s.trim().is_empty()) {
            config.namespace = namespace.trim().to_string();
        }
        if let Some(path) = lookup(ENV_DB_PATH).filter(|s| !s.is_empty()) {
            config.database_path = Some(PathBuf::from(path));
        }
        if let Some(raw) = lookup(ENV_SYNC_MAX_ATTEMPTS) {
            config.sync.max_attempts = raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| ConfigError::InvalidValue {
                    key: ENV_SYNC_MAX_ATTEMPTS.to_string(),
                    value: raw.clone(),
                })?;
        }

        Ok(config)
    }
}
