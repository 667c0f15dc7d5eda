use crate::{
    Db,
    types::{VoteRecordRows as _, VoteRow, parse_direction},
};
use ev_core::{
    models::{Direction, SubmissionId, VoteRecord, VoterState, VoterToken},
    ports::{Recorded, VoteRepository},
};
use sqlx::{Sqlite, Transaction};
use tracing::{Level, event};

pub(super) async fn all_votes(
    tx: &mut Transaction<'_, Sqlite>,
) -> Result<Vec<VoteRow>, sqlx::Error> {
    sqlx::query_as::<_, VoteRow>("select submission_id, user_token, vote from votes")
        .fetch_all(&mut **tx)
        .await
}

pub(super) async fn aggregate(
    tx: &mut Transaction<'_, Sqlite>,
    submission_id: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        select
            coalesce(sum(case vote when 'up' then 1 else -1 end), 0)
        from
            votes
        where
            submission_id = $1
        "#,
    )
    .bind(submission_id)
    .fetch_one(&mut **tx)
    .await
}

impl VoteRepository for Db {
    async fn list_votes(&self) -> Result<Vec<VoteRecord>, Self::Error> {
        let mut tx = self.reader.begin().await?;
        let rows = all_votes(&mut tx).await?;
        tx.commit().await?;
        rows.into_records()
    }

    async fn get_vote(
        &self,
        submission_id: SubmissionId,
        voter: &VoterToken,
    ) -> Result<Option<Direction>, Self::Error> {
        let vote = sqlx::query_scalar::<_, String>(
            "select vote from votes where submission_id = $1 and user_token = $2",
        )
        .bind(submission_id.to_string())
        .bind(voter.as_str())
        .fetch_optional(&self.reader)
        .await?;

        vote.as_deref().map(parse_direction).transpose()
    }

    async fn record_vote(
        &self,
        submission_id: SubmissionId,
        voter: &VoterToken,
        expected: VoterState,
        state: VoterState,
        delta: i64,
    ) -> Result<Recorded, Self::Error> {
        let id = submission_id.to_string();
        let mut tx = self.writer.begin().await?;

        let exists = sqlx::query_scalar::<_, bool>(
            "select exists (select 1 from submissions where id = $1)",
        )
        .bind(&id)
        .fetch_one(&mut *tx)
        .await?;
        if !exists {
            return Ok(Recorded::Missing);
        }

        let current: VoterState = sqlx::query_scalar::<_, String>(
            "select vote from votes where submission_id = $1 and user_token = $2",
        )
        .bind(&id)
        .bind(voter.as_str())
        .fetch_optional(&mut *tx)
        .await?
        .as_deref()
        .map(parse_direction)
        .transpose()?
        .into();
        if current != expected {
            return Ok(Recorded::Stale(current));
        }

        match state.direction() {
            Some(direction) => {
                sqlx::query(
                    r#"
                    insert into
                        votes (submission_id, user_token, vote)
                    values
                        ($1, $2, $3)
                    on conflict (submission_id, user_token)
                        do update set vote = excluded.vote
                    "#,
                )
                .bind(&id)
                .bind(voter.as_str())
                .bind(direction.as_str())
                .execute(&mut *tx)
                .await?;
            }
            None => {
                sqlx::query("delete from votes where submission_id = $1 and user_token = $2")
                    .bind(&id)
                    .bind(voter.as_str())
                    .execute(&mut *tx)
                    .await?;
            }
        }

        // the delta is only informative here; the fresh sum is what counts
        let total = aggregate(&mut tx, &id).await?;

        sqlx::query("update submissions set votes = $1 where id = $2")
            .bind(total)
            .bind(&id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        event!(Level::DEBUG, submission = %submission_id, delta, total);
        Ok(Recorded::Applied(total))
    }
}
