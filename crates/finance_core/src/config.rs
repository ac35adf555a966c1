//! Runtime configuration for opening the store and starting logging.
//!
//! Values come from `FINANCE_DB_PATH`, `FINANCE_LOG_LEVEL` and
//! `FINANCE_LOG_DIR`; anything unset falls back to the platform data
//! directory and [`default_log_level`].

use crate::logging::{default_log_level, normalize_level};
use directories::ProjectDirs;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "FINANCE_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "FINANCE_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "FINANCE_LOG_DIR";

const DB_FILE_NAME: &str = "finance.sqlite3";
const LOG_DIR_NAME: &str = "logs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No override was given and the platform has no data directory.
    NoDataDir,
    InvalidLogLevel(String),
    /// Log directories must be absolute.
    RelativeLogDir(PathBuf),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoDataDir => write!(
                f,
                "could not determine a platform data directory; set {ENV_DB_PATH} and {ENV_LOG_DIR}"
            ),
            Self::InvalidLogLevel(message) => write!(f, "{message}"),
            Self::RelativeLogDir(path) => write!(
                f,
                "{ENV_LOG_DIR} must be an absolute path, got `{}`",
                path.display()
            ),
        }
    }
}

impl Error for ConfigError {}

/// Resolved locations and verbosity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinanceConfig {
    pub db_path: PathBuf,
    pub log_level: &'static str,
    pub log_dir: PathBuf,
}

impl FinanceConfig {
    /// Resolves configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::resolve(|key| std::env::var(key).ok(), default_data_dir)
    }

    /// Resolves configuration from `lookup`, asking `data_dir` only when a
    /// path is not overridden. Blank values count as unset.
    pub fn resolve(
        lookup: impl Fn(&str) -> Option<String>,
        data_dir: impl FnOnce() -> Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let db_override = read(ENV_DB_PATH).map(PathBuf::from);
        let log_dir_override = read(ENV_LOG_DIR).map(PathBuf::from);

        let log_level = match read(ENV_LOG_LEVEL) {
            Some(value) => normalize_level(&value).map_err(ConfigError::InvalidLogLevel)?,
            None => default_log_level(),
        };

        let base_dir = if db_override.is_none() || log_dir_override.is_none() {
            data_dir()
        } else {
            None
        };

        let db_path = db_override
            .or_else(|| base_dir.as_ref().map(|base| base.join(DB_FILE_NAME)))
            .ok_or(ConfigError::NoDataDir)?;
        let log_dir = log_dir_override
            .or_else(|| base_dir.as_ref().map(|base| base.join(LOG_DIR_NAME)))
            .ok_or(ConfigError::NoDataDir)?;

        if !log_dir.is_absolute() {
            return Err(ConfigError::RelativeLogDir(log_dir));
        }

        Ok(Self {
            db_path,
            log_level,
            log_dir,
        })
    }
}

fn default_data_dir() -> Option<PathBuf> {
    ProjectDirs::from("com", "finanzas", "finance").map(|dirs| dirs.data_dir().to_path_buf())
}
