#![warn(missing_docs)]
//! Core types and logic for the edit-of-the-year contest.
//!
//! Users submit links to video posts with a caption, an author handle and a
//! category; the community up- or down-votes each submission and a ranked
//! feed plus a top-5 leaderboard are derived from the vote totals. This crate
//! holds everything that does not depend on how the data is stored:
//!
//! - [`models`]: submissions, ledger entries, categories and the view projection
//! - [`admission`]: validation of new submissions
//! - [`ledger`]: recomputation of aggregates from ledger rows
//! - [`engine`]: the vote state machine and the contest operations
//! - [`ports`]: the traits a persistence backend implements
//! - [`session`]: a single device's snapshot, refreshed by polling

/// Core domain models for the contest.
///
/// The models in this module are primarily data structures with minimal
/// business logic. The vote state machine lives on [`models::VoterState`],
/// while the projections used for rendering the feed and the leaderboard are
/// pure functions over a snapshot of submissions.
pub mod models;

/// Validation pipeline for new submissions.
pub mod admission;

/// Aggregation of ledger rows into vote totals.
pub mod ledger;

/// The contest operations, composed from the ports.
pub mod engine;

/// Interface traits for the contest.
///
/// This module contains the "ports" in the hexagonal architecture pattern.
/// A backend implements [`ports::SubmissionRepository`],
/// [`ports::VoteRepository`] and [`ports::CategoryRepository`]; the engine and
/// the HTTP layer only ever speak to these traits.
pub mod ports;

/// A single device's view of the contest.
pub mod session;

mod error;
pub use error::{ContestError, Rejection};
