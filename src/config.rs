//! Runtime configuration.
//!
//! Credentials and search paths are resolved once at the application edge
//! and passed into the core as plain values; core modules never read the
//! environment themselves.

use std::path::PathBuf;
use std::time::Duration;

/// Database connection settings, sourced from the environment.
///
/// All four values must be present (and non-empty) for the database path to
/// be attempted at all; anything less is treated like a connection failure
/// so the caller falls back to CSV discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub server: String,
    /// Path of the SQLite run-history database.
    pub database: String,
    pub user: String,
    pub password: String,
}

impl DbConfig {
    /// Read `DB_SERVER`, `DB_NAME`, `DB_UID`, `DB_PWD` from the environment
    /// (a `.env` file is honored when present).
    pub fn from_env() -> Option<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Environment-independent constructor used by `from_env` and by tests.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let required = |key| get(key).filter(|v: &String| !v.trim().is_empty());
        Some(Self {
            server: required("DB_SERVER")?,
            database: required("DB_NAME")?,
            user: required("DB_UID")?,
            password: required("DB_PWD")?,
        })
    }
}

/// Everything the load-and-aggregate cycle needs to run.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `None` when credentials are incomplete or the CSV-only flag is set.
    pub db: Option<DbConfig>,
    /// Directories scanned for `flow_data_*.csv`, in order.
    pub search_dirs: Vec<PathBuf>,
    /// Bound on how long a database open/query may block.
    pub busy_timeout: Duration,
}

impl AppConfig {
    pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

    /// Configuration with environment-sourced credentials and the standard
    /// search locations (project root, then `data/`).
    pub fn from_env() -> Self {
        Self {
            db: DbConfig::from_env(),
            search_dirs: Self::default_search_dirs(),
            busy_timeout: Self::DEFAULT_BUSY_TIMEOUT,
        }
    }

    pub fn default_search_dirs() -> Vec<PathBuf> {
        vec![PathBuf::from("."), PathBuf::from("data")]
    }

    /// Same configuration with the database path disabled.
    pub fn csv_only(mut self) -> Self {
        self.db = None;
        self
    }
}
