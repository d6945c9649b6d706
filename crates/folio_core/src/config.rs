//! Runtime configuration for the Folio core.
//!
//! # Responsibility
//! - Collect tunables (lock wait, paging, analytics windows, log target) in
//!   one value handed to the API facade.
//! - Load overrides from `FOLIO_*` environment variables.
//!
//! # Invariants
//! - Unparsable values are errors, never silently replaced by defaults.
//! - `default_page_size <= max_page_size` and both are non-zero.

use crate::logging::{default_log_level, LoggingConfig};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

/// Core configuration with development-friendly defaults.
///
/// | Env Var                           | Default                 |
/// |-----------------------------------|-------------------------|
/// | `FOLIO_DB_PATH`                   | unset (in-memory)       |
/// | `FOLIO_LOG_LEVEL`                 | `debug` / `info`        |
/// | `FOLIO_LOG_DIR`                   | unset (stderr)          |
/// | `FOLIO_LOCK_WAIT_MS`              | `2000`                  |
/// | `FOLIO_BUSY_TIMEOUT_MS`           | `5000`                  |
/// | `FOLIO_DEFAULT_PAGE_SIZE`         | `20`                    |
/// | `FOLIO_MAX_PAGE_SIZE`             | `100`                   |
/// | `FOLIO_RECENT_HISTORY_LIMIT`      | `10`                    |
/// | `FOLIO_ANALYTICS_RECENT_PROJECTS` | `5`                     |
/// | `FOLIO_ANALYTICS_RECENT_HISTORY`  | `10`                    |
/// | `FOLIO_PLACEHOLDER_CONTENT`       | empty string            |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: Option<PathBuf>,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
    /// Wait budget for the per-document lock before reporting a conflict.
    pub lock_wait: Duration,
    /// SQLite busy timeout for cross-connection write contention.
    pub busy_timeout: Duration,
    pub default_page_size: u32,
    pub max_page_size: u32,
    pub recent_history_limit: u32,
    pub analytics_recent_projects: u32,
    pub analytics_recent_history: u32,
    /// Content given to a project's document at creation.
    pub placeholder_content: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
            lock_wait: Duration::from_millis(2_000),
            busy_timeout: Duration::from_millis(5_000),
            default_page_size: 20,
            max_page_size: 100,
            recent_history_limit: 10,
            analytics_recent_projects: 5,
            analytics_recent_history: 10,
            placeholder_content: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue { key: &'static str, value: String },
    Inconsistent(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value } => {
                write!(f, "invalid value `{value}` for `{key}`")
            }
            Self::Inconsistent(message) => write!(f, "inconsistent configuration: {message}"),
        }
    }
}

impl Error for ConfigError {}

impl CoreConfig {
    /// Loads configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_blank = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let config = Self {
            db_path: non_blank("FOLIO_DB_PATH").map(PathBuf::from),
            log_level: non_blank("FOLIO_LOG_LEVEL").unwrap_or(defaults.log_level),
            log_dir: non_blank("FOLIO_LOG_DIR").map(PathBuf::from),
            lock_wait: parse_millis(&lookup, "FOLIO_LOCK_WAIT_MS")?.unwrap_or(defaults.lock_wait),
            busy_timeout: parse_millis(&lookup, "FOLIO_BUSY_TIMEOUT_MS")?
                .unwrap_or(defaults.busy_timeout),
            default_page_size: parse_positive(&lookup, "FOLIO_DEFAULT_PAGE_SIZE")?
                .unwrap_or(defaults.default_page_size),
            max_page_size: parse_positive(&lookup, "FOLIO_MAX_PAGE_SIZE")?
                .unwrap_or(defaults.max_page_size),
            recent_history_limit: parse_positive(&lookup, "FOLIO_RECENT_HISTORY_LIMIT")?
                .unwrap_or(defaults.recent_history_limit),
            analytics_recent_projects: parse_positive(&lookup, "FOLIO_ANALYTICS_RECENT_PROJECTS")?
                .unwrap_or(defaults.analytics_recent_projects),
            analytics_recent_history: parse_positive(&lookup, "FOLIO_ANALYTICS_RECENT_HISTORY")?
                .unwrap_or(defaults.analytics_recent_history),
            // Raw lookup: an explicitly empty placeholder is meaningful.
            placeholder_content: lookup("FOLIO_PLACEHOLDER_CONTENT")
                .unwrap_or(defaults.placeholder_content),
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field constraints.
    /// Logging settings carried by this configuration.
    pub fn logging(&self) -> LoggingConfig {
        LoggingConfig::new(self.log_level.clone(), self.log_dir.clone())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_page_size > self.max_page_size {
            return Err(ConfigError::Inconsistent(format!(
                "default page size {} exceeds max page size {}",
                self.default_page_size, self.max_page_size
            )));
        }
        Ok(())
    }
}

fn parse_positive<F>(lookup: &F, key: &'static str) -> Result<Option<u32>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    match raw.trim().parse::<u32>() {
        Ok(value) if value > 0 => Ok(Some(value)),
        _ => Err(ConfigError::InvalidValue { key, value: raw }),
    }
}

fn parse_millis<F>(lookup: &F, key: &'static str) -> Result<Option<Duration>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<u64>()
        .map(|millis| Some(Duration::from_millis(millis)))
        .map_err(|_| ConfigError::InvalidValue { key, value: raw })
}
