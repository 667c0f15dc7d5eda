use super::{Category, ExternalPostId, SubmissionId, Timestamp};

/// One contest entry.
///
/// Everything but `category` and `vote_count` is fixed at creation. The
/// `vote_count` is never authoritative on its own: it mirrors the sum of the
/// directional votes in the ledger, either adjusted in place by the engine
/// (local mode) or recomputed from the ledger on every load (shared mode).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Submission {
    /// Unique identifier, assigned at creation
    pub id: SubmissionId,
    /// The link as it was submitted
    pub source_url: String,
    /// The post id extracted from `source_url`, unique across submissions
    pub external_post_id: ExternalPostId,
    /// Short, non-empty description
    pub caption: String,
    /// The category tag, reassignable by an admin
    pub category: Category,
    /// Display handle, without a leading `@`
    pub author: String,
    /// Creation time
    pub created_at: Timestamp,
    /// Net vote total (ups minus downs)
    pub vote_count: i64,
}
