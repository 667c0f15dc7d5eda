//! Configuration for the local, file-backed store.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where (and whether) the local store keeps its documents.
///
/// # Examples
///
/// ```
/// use ev_local::config::LocalConfig;
/// use std::path::PathBuf;
///
/// // Everything in memory, starting from the example submissions (default)
/// let config = LocalConfig::default();
///
/// // Persisted under a directory, starting empty
/// let config = LocalConfig {
///     directory: Some(PathBuf::from("contest-data")),
///     seed: false,
/// };
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct LocalConfig {
    /// Directory holding the documents. If None, nothing is written to disk
    pub directory: Option<PathBuf>,

    /// Whether to start from example submissions when none were ever saved
    #[serde(default = "default_true")]
    pub seed: bool,
}

fn default_true() -> bool {
    true
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            directory: None,
            seed: true,
        }
    }
}
