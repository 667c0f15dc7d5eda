//! Where the shared store keeps its database, and how patient it is with a
//! busy writer.
//!
//! Without a path the database lives in memory. The reader pool and the
//! writer connection then each open their own private database, which is
//! only suitable for tests and single-process demos.

use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

/// Configuration of the shared store.
///
/// # Examples
///
/// ```
/// use ev_sqlite::config::SqliteConfig;
/// use std::time::Duration;
///
/// // In-memory database (default)
/// let config = SqliteConfig::default();
/// assert!(config.is_in_memory());
///
/// // A file shared by every device, created on first use
/// let config = SqliteConfig::in_file("contest.db");
/// assert!(config.create_if_missing);
/// assert_eq!(config.busy_timeout, Duration::from_secs(5));
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct SqliteConfig {
    /// Database file path. If None, uses in-memory database
    pub database_path: Option<PathBuf>,

    /// Whether to create the database if it doesn't exist
    #[serde(default = "default_true")]
    pub create_if_missing: bool,

    /// How long a statement waits on a locked database before failing, e.g. `"5s"`
    #[serde(default = "default_busy_timeout", with = "humantime_serde")]
    #[cfg_attr(feature = "schemars", schemars(with = "String"))]
    pub busy_timeout: Duration,
}

impl SqliteConfig {
    /// A database kept in the file at `path`, created if missing
    pub fn in_file(path: impl AsRef<Path>) -> Self {
        Self {
            database_path: Some(path.as_ref().to_path_buf()),
            ..Self::default()
        }
    }

    /// Whether the database only lives in memory
    pub fn is_in_memory(&self) -> bool {
        self.database_path.is_none()
    }
}

fn default_true() -> bool {
    true
}

fn default_busy_timeout() -> Duration {
    Duration::from_secs(5)
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            create_if_missing: true,
            busy_timeout: default_busy_timeout(),
        }
    }
}
