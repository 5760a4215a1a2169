//! Runtime configuration for hosts embedding the core.
//!
//! # Responsibility
//! - Resolve the database path and logging settings with stable defaults.
//! - Read overrides from `FEEAPP_*` environment variables.
//!
//! # Invariants
//! - Blank override values are rejected rather than silently defaulted.

use crate::logging::{default_log_level, LogLevel, LoggingError};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DEFAULT_DB_FILE_NAME: &str = "students.db";

pub const ENV_DB_PATH: &str = "FEEAPP_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "FEEAPP_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "FEEAPP_LOG_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// SQLite file backing the student store; created when absent.
    pub db_path: PathBuf,
    pub log_level: LogLevel,
    /// File logging is disabled when `None`.
    pub log_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyValue(&'static str),
    LogLevel(LoggingError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyValue(key) => write!(f, "configuration value `{key}` must not be empty"),
            Self::LogLevel(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::EmptyValue(_) => None,
            Self::LogLevel(err) => Some(err),
        }
    }
}

impl AppConfig {
    /// Defaults overridden by `FEEAPP_DB_PATH`, `FEEAPP_LOG_LEVEL` and
    /// `FEEAPP_LOG_DIR`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = non_blank(&lookup, ENV_DB_PATH)? {
            config.db_path = PathBuf::from(value);
        }
        if let Some(value) = non_blank(&lookup, ENV_LOG_LEVEL)? {
            config.log_level = value.parse().map_err(ConfigError::LogLevel)?;
        }
        if let Some(value) = non_blank(&lookup, ENV_LOG_DIR)? {
            config.log_dir = Some(PathBuf::from(value));
        }

        Ok(config)
    }
}

fn non_blank(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<String>, ConfigError> {
    match lookup(key) {
        None => Ok(None),
        Some(value) if value.trim().is_empty() => Err(ConfigError::EmptyValue(key)),
        Some(value) => Ok(Some(value.trim().to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, ConfigError, DEFAULT_DB_FILE_NAME, ENV_DB_PATH};
    use crate::logging::{default_log_level, LogLevel};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_without_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.db_path, PathBuf::from(DEFAULT_DB_FILE_NAME));
        assert_eq!(config.log_level, default_log_level());
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn overrides_replace_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("FEEAPP_DB_PATH", "/data/fees.db"),
            ("FEEAPP_LOG_LEVEL", "WARN"),
            ("FEEAPP_LOG_DIR", "/var/log/feeapp"),
        ]))
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/data/fees.db"));
        assert_eq!(config.log_level, LogLevel::Warn);
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/feeapp")));
    }

    #[test]
    fn blank_override_is_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[("FEEAPP_DB_PATH", "  ")])).unwrap_err();
        assert_eq!(err, ConfigError::EmptyValue(ENV_DB_PATH));
    }

    #[test]
    fn unknown_log_level_is_rejected() {
        let err =
            AppConfig::from_lookup(lookup_from(&[("FEEAPP_LOG_LEVEL", "loud")])).unwrap_err();
        assert!(matches!(err, ConfigError::LogLevel(_)));
    }
}
