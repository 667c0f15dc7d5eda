//! The on-disk shape of the three documents.
//!
//! Submissions keep the field names the contest has always used in its
//! stored JSON (`tweetUrl`, `tweetId`, `votes`, `timestamp`), so a document
//! written by an older build still loads.
//!
//! Older builds also used short ids such as `"1"` and kept a single flat
//! `{ submission: direction }` vote map for the device. Such an id is mapped
//! to a name-based UUID, so the same id always lands on the same submission,
//! and a flat vote map is filed under [`DEVICE_VOTER`].

use ev_core::{
    admission::normalize_author,
    models::{Category, Direction, ExternalPostId, Map, Submission, SubmissionId, Timestamp, VoterToken},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// File holding the submissions collection
pub const SUBMISSIONS_FILE: &str = "submissions.json";
/// File holding the vote map of every voter on this device
pub const VOTES_FILE: &str = "votes.json";
/// File holding the category list
pub const CATEGORIES_FILE: &str = "categories.json";

/// The voter a flat, single-device vote map is attributed to
pub const DEVICE_VOTER: &str = "this-device";

/// The votes document: voter token, then submission, then direction.
pub type VoteMap = Map<VoterToken, Map<SubmissionId, Direction>>;

/// Resolve a stored submission id: a UUID is kept as is, anything else is
/// mapped to the same name-based UUID every time.
pub fn resolve_id(raw: &str) -> SubmissionId {
    raw.parse().unwrap_or_else(|_| {
        SubmissionId::from(Uuid::new_v5(&Uuid::NAMESPACE_URL, format!("yilin-editi:{raw}").as_bytes()))
    })
}

fn is_legacy_id(raw: &str) -> bool {
    raw.parse::<SubmissionId>().is_err()
}

/// The votes document as read, before ids are resolved
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum StoredVotes {
    ByVoter(Map<VoterToken, Map<String, Direction>>),
    Device(Map<String, Direction>),
}

impl StoredVotes {
    /// Whether the document has to be rewritten in the current shape
    pub(crate) fn is_legacy(&self) -> bool {
        match self {
            Self::ByVoter(votes) => votes
                .values()
                .flat_map(|mine| mine.keys())
                .any(|id| is_legacy_id(id)),
            Self::Device(_) => true,
        }
    }

    pub(crate) fn into_vote_map(self) -> VoteMap {
        let resolve = |mine: Map<String, Direction>| -> Map<SubmissionId, Direction> {
            mine.into_iter()
                .map(|(id, direction)| (resolve_id(&id), direction))
                .collect()
        };
        match self {
            Self::ByVoter(votes) => votes
                .into_iter()
                .map(|(voter, mine)| (voter, resolve(mine)))
                .filter(|(_, mine)| !mine.is_empty())
                .collect(),
            Self::Device(mine) => match DEVICE_VOTER.parse::<VoterToken>() {
                Ok(voter) if !mine.is_empty() => [(voter, resolve(mine))].into_iter().collect(),
                _ => VoteMap::default(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoredSubmission {
    id: String,
    tweet_url: String,
    tweet_id: ExternalPostId,
    caption: String,
    #[serde(default = "Category::fallback")]
    category: Category,
    #[serde(default)]
    votes: i64,
    timestamp: Timestamp,
    #[serde(default)]
    author: String,
}

impl StoredSubmission {
    /// Whether the id was written by an older build
    pub(crate) fn has_legacy_id(&self) -> bool {
        is_legacy_id(&self.id)
    }
}

impl From<StoredSubmission> for Submission {
    fn from(value: StoredSubmission) -> Self {
        Self {
            id: resolve_id(&value.id),
            source_url: value.tweet_url,
            external_post_id: value.tweet_id,
            caption: value.caption,
            category: value.category,
            author: normalize_author(&value.author),
            created_at: value.timestamp,
            vote_count: value.votes,
        }
    }
}

impl From<&Submission> for StoredSubmission {
    fn from(value: &Submission) -> Self {
        Self {
            id: value.id.to_string(),
            tweet_url: value.source_url.clone(),
            tweet_id: value.external_post_id.clone(),
            caption: value.caption.clone(),
            category: value.category.clone(),
            votes: value.vote_count,
            timestamp: value.created_at,
            author: value.author.clone(),
        }
    }
}

/// The two example entries a fresh store starts with.
pub(crate) fn seed(now: Timestamp) -> Vec<Submission> {
    let example = |url: &str, post: &str, caption: &str, votes: i64, age: i64, author: &str| {
        post.parse().ok().map(|external_post_id| Submission {
            id: SubmissionId::random(),
            source_url: url.to_owned(),
            external_post_id,
            caption: caption.to_owned(),
            category: Category::fallback(),
            author: author.to_owned(),
            created_at: now.offset_millis(-age),
            vote_count: votes,
        })
    };

    // newest first
    [
        example(
            "https://twitter.com/memes/status/1293593516040269825",
            "1293593516040269825",
            "Bu kedi aynı ben ya",
            89,
            5_000_000,
            "KediSever",
        ),
        example(
            "https://twitter.com/elonmusk/status/1608273870901096454",
            "1608273870901096454",
            "Matrix hatası gibi olay",
            142,
            10_000_000,
            "MatrixFan",
        ),
    ]
    .into_iter()
    .flatten()
    .collect()
}
