//! Runtime configuration resolved from the environment.
//!
//! | variable          | default                              |
//! |-------------------|--------------------------------------|
//! | `TEAMS_DB_PATH`   | `<temp dir>/teams.sqlite3`           |
//! | `TEAMS_LOG_LEVEL` | [`default_log_level`]                |
//! | `TEAMS_LOG_DIR`   | unset: log to stderr                 |
//!
//! Blank values count as unset.

use crate::logging::{check_log_dir, default_log_level, normalize_level, LogTarget};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DB_PATH_VAR: &str = "TEAMS_DB_PATH";
pub const LOG_LEVEL_VAR: &str = "TEAMS_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "TEAMS_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "teams.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidLogLevel(String),
    InvalidLogDir(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLogLevel(message) => write!(f, "{LOG_LEVEL_VAR}: {message}"),
            Self::InvalidLogDir(message) => write!(f, "{LOG_DIR_VAR}: {message}"),
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: &'static str,
    pub log_target: LogTarget,
}

impl CoreConfig {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves configuration through `lookup`, which maps a variable name
    /// to its raw value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let db_path = read(DB_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME));

        let log_level = match read(LOG_LEVEL_VAR) {
            Some(raw) => normalize_level(&raw).map_err(ConfigError::InvalidLogLevel)?,
            None => default_log_level(),
        };

        let log_target = match read(LOG_DIR_VAR) {
            Some(raw) => {
                let dir = PathBuf::from(raw);
                check_log_dir(&dir).map_err(ConfigError::InvalidLogDir)?;
                LogTarget::Directory(dir)
            }
            None => LogTarget::Stderr,
        };

        Ok(Self {
            db_path,
            log_level,
            log_target,
        })
    }
}
