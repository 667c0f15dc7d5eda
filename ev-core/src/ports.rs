use crate::models::{SubmissionId, Timestamp, VoterToken};
use std::future::Future;

mod category;
mod submission;
mod vote;

pub use category::CategoryRepository;
pub use submission::SubmissionRepository;
pub use vote::{Recorded, VoteRepository};

/// The base trait every repository builds on.
///
/// A single error type is shared by all the operations of a backend; the
/// engine wraps it in [`crate::ContestError::BackendUnavailable`].
pub trait Repository: Send + Sync {
    /// The error returned by any persistence operation
    type Error: std::error::Error + Send + Sync + 'static;
}

/// The "marker" trait that is used everywhere and implies implementation of all the above
pub trait ContestRepository:
    Repository + SubmissionRepository + VoteRepository + CategoryRepository
{
}

impl<T> ContestRepository for T where
    T: Repository + SubmissionRepository + VoteRepository + CategoryRepository
{
}

/// Binds a repository together with the decisions a deployment makes for
/// itself: the clock, the id scheme and who counts as an admin.
pub trait Application: Send + Sync {
    /// The authorization context extracted from a request
    type Context: Send + Sync;

    /// The persistence backend
    type Repository: ContestRepository;

    /// Access the backend
    fn database(&self) -> &Self::Repository;

    /// The current time
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }

    /// Mint the id of a new submission
    fn generate_submission_id(&self) -> SubmissionId {
        SubmissionId::random()
    }

    /// Mint a token for a device that has none yet
    fn generate_voter_token(&self) -> VoterToken {
        VoterToken::random()
    }

    /// Whether the context may delete submissions and manage categories
    fn is_admin(&self, context: &Self::Context) -> impl Future<Output = bool> + Send;
}
