//! # Database Configuration
//!
//! Pool settings plus environment loading. A missing connection setting is a
//! configuration fault, not a transport failure - see [`DbConfig::from_env`].

use std::path::PathBuf;
use std::time::Duration;

use tracing::debug;

use crate::error::{DbError, DbResult};

/// Environment variable holding the SQLite database path.
pub const ENV_DATABASE_PATH: &str = "WARUNG_DATABASE_PATH";

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("./data/warung.db").max_connections(5);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file (`:memory:` for tests).
    pub database_path: PathBuf,

    /// Maximum number of pooled connections. Default: 5.
    pub max_connections: u32,

    /// Minimum number of connections kept alive. Default: 1.
    pub min_connections: u32,

    /// Connection acquire timeout. Default: 30 seconds.
    pub connect_timeout: Duration,

    /// Whether to run migrations on connect. Default: true.
    pub run_migrations: bool,
}

impl DbConfig {
    /// Creates a configuration for the given database file path.
    /// The file is created on first connect if it does not exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            run_migrations: true,
        }
    }

    /// Loads configuration from the environment.
    ///
    /// Distinguishes the two operator-actionable failure states:
    /// - [`DbError::ConfigurationMissing`] - `WARUNG_DATABASE_PATH` unset
    /// - [`DbError::ConfigurationInvalid`] - set but blank
    pub fn from_env() -> DbResult<Self> {
        let path = std::env::var(ENV_DATABASE_PATH)
            .map_err(|_| DbError::ConfigurationMissing(ENV_DATABASE_PATH.to_string()))?;

        if path.trim().is_empty() {
            return Err(DbError::ConfigurationInvalid(format!(
                "{} is set but blank",
                ENV_DATABASE_PATH
            )));
        }

        debug!(path = %path, "Database path loaded from environment");
        Ok(DbConfig::new(path))
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// In-memory database for tests. Single connection: each in-memory
    /// connection is its own database, so the pool must never open a second.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    /// Whether this configuration points at an in-memory database.
    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == ":memory:"
    }
}
