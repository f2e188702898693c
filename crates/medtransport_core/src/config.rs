//! Startup configuration for the scheduling store.
//!
//! # Responsibility
//! - Load the database connection string and logging settings from a JSON file.
//! - Apply `MEDTRANSPORT_*` environment overrides on top of file values.
//!
//! # Invariants
//! - Environment values win over file values; file values win over defaults.
//! - Loading never opens the database; see [`StoreConfig::open_database`].

use crate::db::{open_from_uri, DbResult};
use crate::logging::{default_log_level, init_logging, LoggingError};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const ENV_DATABASE_URI: &str = "MEDTRANSPORT_DATABASE_URI";
pub const ENV_LOG_LEVEL: &str = "MEDTRANSPORT_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "MEDTRANSPORT_LOG_DIR";

const DEFAULT_DATABASE_URI: &str = "sqlite:///medtransport.db";

/// Store settings read once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// SQLAlchemy-style SQLite URI or a bare path.
    pub database_uri: String,
    /// `trace|debug|info|warn|error`; `None` means the build default.
    pub log_level: Option<String>,
    /// Absolute directory for rolling log files; `None` disables file logging.
    pub log_dir: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_uri: DEFAULT_DATABASE_URI.to_string(),
            log_level: None,
            log_dir: None,
        }
    }
}

impl StoreConfig {
    /// Reads a JSON config file. Missing keys fall back to defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: Some(path.to_path_buf()),
                source,
            },
            other => other,
        })
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|source| ConfigError::Parse { path: None, source })?;
        config.validated()
    }

    /// Overlays values returned by `lookup` for the `MEDTRANSPORT_*` keys.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(uri) = lookup(ENV_DATABASE_URI) {
            self.database_uri = uri;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.log_level = Some(level);
        }
        if let Some(dir) = lookup(ENV_LOG_DIR) {
            self.log_dir = Some(dir);
        }
        self.validated()
    }

    /// Overlays the process environment.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Effective log level.
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(default_log_level())
    }

    /// Starts file logging when `log_dir` is configured.
    ///
    /// Returns `Ok(false)` when no directory is configured.
    pub fn init_logging(&self) -> Result<bool, LoggingError> {
        let Some(log_dir) = self.log_dir.as_deref() else {
            return Ok(false);
        };
        init_logging(self.log_level(), log_dir)?;
        Ok(true)
    }

    /// Opens and bootstraps the configured database.
    pub fn open_database(&self) -> DbResult<Connection> {
        open_from_uri(&self.database_uri)
    }

    fn validated(self) -> Result<Self, ConfigError> {
        if self.database_uri.trim().is_empty() {
            return Err(ConfigError::MissingDatabaseUri);
        }
        Ok(self)
    }
}

/// Configuration loading errors.
#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: Option<PathBuf>,
        source: serde_json::Error,
    },
    MissingDatabaseUri,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse {
                path: Some(path),
                source,
            } => write!(f, "invalid config `{}`: {source}", path.display()),
            Self::Parse { path: None, source } => write!(f, "invalid config: {source}"),
            Self::MissingDatabaseUri => write!(f, "database_uri must not be empty"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::MissingDatabaseUri => None,
        }
    }
}
