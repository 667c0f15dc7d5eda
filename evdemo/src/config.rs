//! Application configuration management.
//!
//! This module handles loading and merging configuration from multiple sources
//! with a clear precedence order. Configuration can come from default values,
//! configuration files, and environment variables.

use crate::{Cli, Poller};
use ev_local::config::LocalConfig;
use ev_sqlite::config::SqliteConfig;
use serde::{Deserialize, Serialize};

/// The main application configuration that composes all component configs
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct AppConfig {
    /// Web server configuration (bind address, leaderboard size)
    #[serde(default)]
    pub server: ev_axum::config::AxumConfig,

    /// Which backend to use, and how to open it
    #[serde(default)]
    pub storage: StorageConfig,

    /// How often a watching device refreshes
    #[serde(default)]
    pub poll: Poller,
}

/// The persistence mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageMode {
    /// JSON documents owned by a single device
    #[default]
    Local,
    /// A SQLite database any number of devices vote into
    Shared,
}

/// Backend selection; only the section matching `mode` is used
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct StorageConfig {
    /// The active backend
    #[serde(default)]
    pub mode: StorageMode,

    /// Settings of the local backend
    #[serde(default)]
    pub local: LocalConfig,

    /// Settings of the shared backend
    #[serde(default)]
    pub shared: SqliteConfig,
}

impl AppConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Environment variables (highest priority)
    /// 2. Config file given by the CLI
    /// 3. Default values (lowest priority)
    ///
    /// Environment variables are mapped using the pattern:
    /// `APP_<SECTION>__<KEY>` maps to `<section>.<key>`
    ///
    /// # Examples
    ///
    /// ```bash
    /// # Use the shared backend, stored in a file
    /// export APP_STORAGE__MODE="shared"
    /// export APP_STORAGE__SHARED__DATABASE_PATH="/data/contest.db"
    ///
    /// # Set server bind address
    /// export APP_SERVER__BIND_ADDRESS="0.0.0.0:3000"
    ///
    /// # Poll twice as often
    /// export APP_POLL__EVERY="10s"
    /// ```
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let mut config = config::Config::builder();

        // Start with default values
        config = config.add_source(config::Config::try_from(&Self::default())?);

        // Layer on config file if it is specified and exists
        if let Some(path) = &cli.config {
            if path.exists() {
                config = config.add_source(config::File::from(path.as_path()))
            } else {
                return Err(anyhow::anyhow!(
                    "Config file {} does not exist",
                    path.display()
                ));
            }
        }

        // Override with environment variables
        // This maps APP_STORAGE__MODE to storage.mode
        config = config.add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let built_config = config.build()?;
        built_config.try_deserialize().map_err(Into::into)
    }
}
