use crate::models::{Category, ExternalPostId, Submission, SubmissionId};
use std::future::Future;

/// Storage of the submissions themselves.
pub trait SubmissionRepository: super::Repository {
    /// Every submission, newest first.
    ///
    /// The `vote_count` of each entry must be the authoritative aggregate:
    /// a backend that keeps the ledger separately recomputes it here rather
    /// than trusting a cached value.
    fn list_submissions(
        &self,
    ) -> impl Future<Output = Result<Vec<Submission>, Self::Error>> + Send;

    /// Retrieve a single submission, returning `None` if it does not exist.
    fn get_submission(
        &self,
        submission_id: SubmissionId,
    ) -> impl Future<Output = Result<Option<Submission>, Self::Error>> + Send;

    /// Whether a submission for this post already exists
    fn post_exists(
        &self,
        post_id: &ExternalPostId,
    ) -> impl Future<Output = Result<bool, Self::Error>> + Send;

    /// Persist a new submission.
    ///
    /// A category that is neither a base one nor already listed is stored in
    /// the same write, so the list only grows when the submission lands.
    ///
    /// # Returns
    ///
    /// - Ok(true) if the submission (and its category) was stored
    /// - Ok(false) if a submission for the same post already exists, in which
    ///   case nothing was written
    /// - Err if nothing was written
    fn insert_submission(
        &self,
        submission: &Submission,
    ) -> impl Future<Output = Result<bool, Self::Error>> + Send;

    /// Delete a submission along with every ledger row referencing it.
    ///
    /// Returns false if no such submission exists.
    fn delete_submission(
        &self,
        submission_id: SubmissionId,
    ) -> impl Future<Output = Result<bool, Self::Error>> + Send;

    /// Reassign the category of a submission.
    ///
    /// Returns false if no such submission exists.
    fn set_category(
        &self,
        submission_id: SubmissionId,
        category: &Category,
    ) -> impl Future<Output = Result<bool, Self::Error>> + Send;
}
