//! Mission runtime configuration (TOML).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_UID: &str = "com.parrot.missions.samples.hello";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse mission config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid mission config: {0}")]
    Invalid(String),
}

/// Settings shared by every mission built from this crate.
///
/// Missing fields fall back to their defaults, so an empty file is a valid
/// configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MissionConfig {
    /// Mission identifier; guidance mode ids are derived from it.
    pub uid: String,

    /// Transitions retained in the state machine history.
    pub history_capacity: usize,

    /// Period of the mission driver task.
    pub driver_period_ms: u64,

    /// Upper bound on events dispatched by a single `process_events` call.
    pub max_events_per_poll: usize,

    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            uid: DEFAULT_UID.to_string(),
            history_capacity: crate::core::DEFAULT_HISTORY_CAPACITY,
            driver_period_ms: 5,
            max_events_per_poll: 256,
            log_filter: "info".to_string(),
        }
    }
}

impl MissionConfig {
    /// Load from `path`, returning the defaults when the file is missing.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        }
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.uid.trim().is_empty() {
            return Err(ConfigError::Invalid("uid must not be empty".into()));
        }
        if self.history_capacity == 0 {
            return Err(ConfigError::Invalid("history_capacity must be > 0".into()));
        }
        if self.driver_period_ms == 0 {
            return Err(ConfigError::Invalid("driver_period_ms must be > 0".into()));
        }
        if self.max_events_per_poll == 0 {
            return Err(ConfigError::Invalid("max_events_per_poll must be > 0".into()));
        }
        Ok(())
    }

    pub fn driver_period(&self) -> Duration {
        Duration::from_millis(self.driver_period_ms)
    }
}
