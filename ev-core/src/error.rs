use crate::models::SubmissionId;
use thiserror::Error;

/// The ways in which a new submission (or a category) can be refused before
/// anything is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    /// The link does not point at a post (no `/status/<digits>` segment)
    #[error("link does not reference a post")]
    InvalidLink,
    /// The caption is empty after trimming
    #[error("caption is empty")]
    EmptyCaption,
    /// The caption exceeds the maximum length
    #[error("caption is longer than {max} characters", max = crate::admission::MAX_CAPTION_CHARS)]
    CaptionTooLong,
    /// The author handle exceeds the maximum length
    #[error("author is longer than {max} characters", max = crate::admission::MAX_AUTHOR_CHARS)]
    AuthorTooLong,
    /// The category is empty after normalization, or is the `all` selector
    #[error("category is empty or reserved")]
    InvalidCategory,
    /// A submission for the same post already exists
    #[error("post has already been submitted")]
    DuplicatePost,
}

/// Every contest operation fails with one of these.
///
/// None of them are fatal: the caller is expected to surface the message and
/// carry on with the state it had before the operation.
#[derive(Debug, Error)]
pub enum ContestError<E> {
    /// The input was refused by validation
    #[error(transparent)]
    Rejected(#[from] Rejection),

    /// The referenced submission does not exist
    #[error("unknown submission {0}")]
    NotFound(SubmissionId),

    /// The persistence backend failed; nothing was applied
    #[error("backend unavailable: {0}")]
    BackendUnavailable(#[source] E),
}

impl<E> ContestError<E> {
    /// Wrap a backend failure
    pub fn backend(err: E) -> Self {
        Self::BackendUnavailable(err)
    }

    /// The validation rejection, if this is one
    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            Self::Rejected(rejection) => Some(*rejection),
            _ => None,
        }
    }
}
