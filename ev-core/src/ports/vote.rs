use crate::models::{Direction, SubmissionId, VoteRecord, VoterState, VoterToken};
use std::future::Future;

/// What became of a [`VoteRepository::record_vote`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recorded {
    /// The entry was written; carries the aggregate after the write
    Applied(i64),
    /// The submission does not exist; nothing was written
    Missing,
    /// The voter's entry no longer matched the expected state; nothing was
    /// written. Carries the entry as it is now.
    Stale(VoterState),
}

/// Storage of the vote ledger.
///
/// Each operation only ever touches the row keyed by its own
/// `(submission, voter)` pair, so concurrent voters never conflict.
pub trait VoteRepository: super::Repository {
    /// Every ledger row
    fn list_votes(&self) -> impl Future<Output = Result<Vec<VoteRecord>, Self::Error>> + Send;

    /// The ledger entry of one voter on one submission, if any
    fn get_vote(
        &self,
        submission_id: SubmissionId,
        voter: &VoterToken,
    ) -> impl Future<Output = Result<Option<Direction>, Self::Error>> + Send;

    /// Write (or clear, for [`VoterState::NoVote`]) a ledger entry and move
    /// the aggregate by `delta`, atomically.
    ///
    /// The write only happens if the voter's entry still equals `expected`,
    /// the state `state` and `delta` were derived from. The comparison and
    /// the write happen under the same lock or transaction.
    ///
    /// # Returns
    ///
    /// - Ok(Recorded::Applied(aggregate)) with the aggregate after the write
    /// - Ok(Recorded::Missing) if the submission does not exist
    /// - Ok(Recorded::Stale(current)) if another write got there first
    /// - Err if nothing was written
    fn record_vote(
        &self,
        submission_id: SubmissionId,
        voter: &VoterToken,
        expected: VoterState,
        state: VoterState,
        delta: i64,
    ) -> impl Future<Output = Result<Recorded, Self::Error>> + Send;
}
