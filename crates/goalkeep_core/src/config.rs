//! Runtime configuration resolved from environment variables.
//!
//! # Invariants
//! - Resolution never fails: blank or missing variables fall back to
//!   defaults under the system temp directory.
//! - Values are trimmed; relative paths are kept as given.

use crate::logging::default_log_level;
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "GOALKEEP_DB_PATH";
pub const BLOB_DIR_ENV: &str = "GOALKEEP_BLOB_DIR";
pub const LOG_LEVEL_ENV: &str = "GOALKEEP_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "GOALKEEP_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "goalkeep.sqlite3";
const DEFAULT_BLOB_DIR_NAME: &str = "goalkeep-blobs";
const DEFAULT_LOG_DIR_NAME: &str = "goalkeep-logs";

/// Paths and levels shared by the FFI and CLI entry points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub blob_dir: PathBuf,
    pub log_level: String,
    pub log_dir: PathBuf,
}

impl AppConfig {
    /// Reads the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves configuration through `lookup`, one call per variable.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_string())
                .filter(|trimmed| !trimmed.is_empty())
        };
        let temp_dir = std::env::temp_dir();

        Self {
            db_path: value(DB_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| temp_dir.join(DEFAULT_DB_FILE_NAME)),
            blob_dir: value(BLOB_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| temp_dir.join(DEFAULT_BLOB_DIR_NAME)),
            log_level: value(LOG_LEVEL_ENV).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: value(LOG_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| temp_dir.join(DEFAULT_LOG_DIR_NAME)),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
