#![warn(missing_docs)]
//! A deployable front for the contest.
//!
//! The `evdemo` binary serves the REST API over either backend, watches a
//! backend the way a device would (refreshing a session on every tick), and
//! mints the admin tokens the API accepts.

pub mod impls;

mod poll;
pub use poll::Poller;

mod cli;
pub use cli::{Cli, Commands};

mod config;
pub use config::{AppConfig, StorageConfig, StorageMode};
