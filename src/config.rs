//! Database-path resolution
//!
//! The vocabulary database location is resolved in priority order:
//! 1. Explicit path from the caller (CLI flag)
//! 2. `LEXMEM_DB_PATH` environment variable
//! 3. Platform data directory (`<data_local_dir>/lexmem/vocab.db`),
//!    falling back to the current directory when no data dir exists

use std::env;
use std::path::PathBuf;

/// Environment variable overriding the database location
pub const DB_PATH_ENV: &str = "LEXMEM_DB_PATH";

/// Default database file name
const DB_FILE_NAME: &str = "vocab.db";

/// Default database path under the platform data directory
pub fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("lexmem")
        .join(DB_FILE_NAME)
}

/// Resolve the database path from an optional explicit override
pub fn resolve_db_path(explicit: Option<String>) -> String {
    explicit
        .or_else(|| env::var(DB_PATH_ENV).ok().filter(|p| !p.is_empty()))
        .unwrap_or_else(|| default_db_path().to_string_lossy().to_string())
}
