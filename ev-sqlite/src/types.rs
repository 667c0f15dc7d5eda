//! Row types and their conversion into the core models.
//!
//! Ids, tags and directions are stored as text and validated on the way
//! out; a row that fails validation surfaces as [`sqlx::Error::Decode`].

use ev_core::models::{Direction, Submission, Timestamp, VoteRecord};

#[derive(sqlx::FromRow)]
pub(crate) struct SubmissionRow {
    pub id: String,
    pub tweet_url: String,
    pub tweet_id: String,
    pub caption: String,
    pub category: String,
    pub timestamp: i64,
    pub author: String,
}

impl SubmissionRow {
    /// Convert, attaching the aggregate computed from the ledger
    pub fn into_submission(self, vote_count: i64) -> Result<Submission, sqlx::Error> {
        Ok(Submission {
            id: decode(self.id.parse())?,
            source_url: self.tweet_url,
            external_post_id: decode(self.tweet_id.parse())?,
            caption: self.caption,
            category: decode(self.category.parse())?,
            author: self.author,
            created_at: Timestamp::from_millis(self.timestamp),
            vote_count,
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct VoteRow {
    pub submission_id: String,
    pub user_token: String,
    pub vote: String,
}

impl TryFrom<VoteRow> for VoteRecord {
    type Error = sqlx::Error;

    fn try_from(row: VoteRow) -> Result<Self, Self::Error> {
        Ok(VoteRecord {
            submission_id: decode(row.submission_id.parse())?,
            voter: decode(row.user_token.parse())?,
            direction: parse_direction(&row.vote)?,
        })
    }
}

pub(crate) fn parse_direction(raw: &str) -> Result<Direction, sqlx::Error> {
    decode(raw.parse::<Direction>())
}

pub(crate) fn decode<T, E>(result: Result<T, E>) -> Result<T, sqlx::Error>
where
    E: Into<sqlx::error::BoxDynError>,
{
    result.map_err(|err| sqlx::Error::Decode(err.into()))
}

/// Conversion of a batch of ledger rows.
pub(crate) trait VoteRecordRows {
    fn into_records(self) -> Result<Vec<VoteRecord>, sqlx::Error>;
}

impl VoteRecordRows for Vec<VoteRow> {
    fn into_records(self) -> Result<Vec<VoteRecord>, sqlx::Error> {
        self.into_iter().map(VoteRecord::try_from).collect()
    }
}
