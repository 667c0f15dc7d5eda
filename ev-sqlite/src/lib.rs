#![warn(missing_docs)]
//! A shared backend for the contest, implemented with SQLite.
//!
//! Many devices may vote on the same submission at once. Every vote only
//! writes or deletes the single row keyed by its own `(submission, voter)`
//! pair, and aggregates are recomputed as a fresh sum of the ledger whenever
//! submissions are read, so concurrent voters never conflict.

use sqlx::sqlite;
use std::str::FromStr;
use tokio::try_join;
use tracing::{Level, event};

pub mod config;
mod r#impl;
mod types;

use config::SqliteConfig;

/// SQLite database implementation of the contest repositories.
///
/// Reads go through a pool of connections, writes through a single
/// connection, which serializes them as WAL mode expects.
///
/// # Example
///
/// ```no_run
/// # use ev_sqlite::{Db, config::SqliteConfig};
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let db = Db::open(&SqliteConfig::default()).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Db {
    /// Connection pool for read operations
    pub reader: sqlx::Pool<sqlx::Sqlite>,
    /// Connection pool for write operations (limited to 1 connection)
    pub writer: sqlx::Pool<sqlx::Sqlite>,
}

impl Db {
    /// Open a connection to the specified SQLite database.
    ///
    /// Creates a new database if one doesn't exist (when `create_if_missing` is true)
    /// and applies all pending migrations.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error` if the connection fails or a migration fails to apply.
    pub async fn open(config: &SqliteConfig) -> Result<Self, sqlx::Error> {
        let db_path = config
            .database_path
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned());

        let options =
            sqlite::SqliteConnectOptions::from_str(db_path.as_deref().unwrap_or(":memory:"))?
                .busy_timeout(config.busy_timeout)
                .foreign_keys(true)
                .journal_mode(sqlite::SqliteJournalMode::Wal)
                .synchronous(sqlite::SqliteSynchronous::Normal)
                .pragma("temp_store", "memory")
                .create_if_missing(config.create_if_missing);

        let reader = sqlite::SqlitePoolOptions::new().connect_with(options.clone());
        let writer = sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options);

        let (reader, writer) = try_join!(reader, writer)?;

        sqlx::migrate!("./schema").run(&writer).await?;

        event!(
            Level::INFO,
            path = db_path.as_deref().unwrap_or(":memory:"),
            busy_timeout = ?config.busy_timeout,
            "opened database"
        );

        Ok(Self { reader, writer })
    }
}
