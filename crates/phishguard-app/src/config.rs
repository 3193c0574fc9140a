//! Environment-driven runtime configuration.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Analysis service base URL used when `PHISHGUARD_API_BASE` is unset.
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:5000";

/// Log filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "phishguard=info";

const DEFAULT_DATA_DIR: &str = ".phishguard";
const DEFAULT_EXPORT_DIR: &str = ".";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Runtime settings for the interactive app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Base URL of the analysis service (`PHISHGUARD_API_BASE`).
    pub api_base: String,
    /// Directory holding persisted history and theme (`PHISHGUARD_DATA_DIR`).
    pub data_dir: PathBuf,
    /// Directory receiving CSV exports (`PHISHGUARD_EXPORT_DIR`).
    pub export_dir: PathBuf,
    /// Provider request timeout (`PHISHGUARD_TIMEOUT_SECS`).
    pub timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            export_dir: PathBuf::from(DEFAULT_EXPORT_DIR),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl AppConfig {
    /// Reads settings from process environment.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when a set variable cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`; blank values count as unset.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidTimeout`] for a non-numeric or zero
    /// timeout.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        let timeout = match read("PHISHGUARD_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => return Err(ConfigError::InvalidTimeout(raw)),
            },
            None => defaults.timeout,
        };

        Ok(Self {
            api_base: read("PHISHGUARD_API_BASE").unwrap_or(defaults.api_base),
            data_dir: read("PHISHGUARD_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            export_dir: read("PHISHGUARD_EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.export_dir),
            timeout,
        })
    }
}

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Timeout is not a positive integer number of seconds.
    #[error("PHISHGUARD_TIMEOUT_SECS must be a positive integer, got {0:?}")]
    InvalidTimeout(String),
}
