//! Repository trait implementations for the SQLite database.

use crate::Db;
use ev_core::ports::Repository;

mod category;
mod submission;
mod vote;

impl Repository for Db {
    type Error = sqlx::Error;
}
