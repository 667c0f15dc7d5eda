use crate::{
    Db,
    types::{SubmissionRow, VoteRecordRows as _},
};
use ev_core::{
    ledger,
    models::{Category, ExternalPostId, Submission, SubmissionId},
    ports::SubmissionRepository,
};
use tracing::{Level, event};

impl SubmissionRepository for Db {
    async fn list_submissions(&self) -> Result<Vec<Submission>, Self::Error> {
        // one read transaction, so the ledger matches the submissions
        let mut tx = self.reader.begin().await?;

        let rows = sqlx::query_as::<_, SubmissionRow>(
            r#"
            select
                id, tweet_url, tweet_id, caption, category, timestamp, author
            from
                submissions
            order by
                timestamp desc
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        let records = super::vote::all_votes(&mut tx).await?.into_records()?;
        tx.commit().await?;

        // the stored `votes` column is ignored in favor of the ledger
        let totals = ledger::tally(&records);
        rows.into_iter()
            .map(|row| {
                let aggregate = row
                    .id
                    .parse::<SubmissionId>()
                    .ok()
                    .and_then(|id| totals.get(&id).copied())
                    .unwrap_or(0);
                row.into_submission(aggregate)
            })
            .collect()
    }

    async fn get_submission(
        &self,
        submission_id: SubmissionId,
    ) -> Result<Option<Submission>, Self::Error> {
        let mut tx = self.reader.begin().await?;
        let id = submission_id.to_string();

        let row = sqlx::query_as::<_, SubmissionRow>(
            r#"
            select
                id, tweet_url, tweet_id, caption, category, timestamp, author
            from
                submissions
            where
                id = $1
            "#,
        )
        .bind(&id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let aggregate = super::vote::aggregate(&mut tx, &id).await?;
        tx.commit().await?;

        Ok(Some(row.into_submission(aggregate)?))
    }

    async fn post_exists(&self, post_id: &ExternalPostId) -> Result<bool, Self::Error> {
        sqlx::query_scalar::<_, bool>(
            r#"
            select exists (select 1 from submissions where tweet_id = $1)
            "#,
        )
        .bind(post_id.as_str())
        .fetch_one(&self.reader)
        .await
    }

    async fn insert_submission(&self, submission: &Submission) -> Result<bool, Self::Error> {
        let mut tx = self.writer.begin().await?;

        let result = sqlx::query(
            r#"
            insert into
                submissions (id, tweet_url, tweet_id, caption, category, votes, timestamp, author)
            values
                ($1, $2, $3, $4, $5, $6, $7, $8)
            on conflict
                do nothing
            "#,
        )
        .bind(submission.id.to_string())
        .bind(&submission.source_url)
        .bind(submission.external_post_id.as_str())
        .bind(&submission.caption)
        .bind(submission.category.as_str())
        .bind(submission.vote_count)
        .bind(submission.created_at.as_millis())
        .bind(&submission.author)
        .execute(&mut *tx)
        .await?;

        // dropping the transaction rolls it back
        if result.rows_affected() != 1 {
            return Ok(false);
        }

        if !submission.category.is_base() {
            let added = super::category::insert(&mut *tx, &submission.category).await?;
            if added {
                event!(Level::INFO, category = %submission.category, "new category");
            }
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn delete_submission(&self, submission_id: SubmissionId) -> Result<bool, Self::Error> {
        // the ledger rows go with it (on delete cascade)
        let result = sqlx::query("delete from submissions where id = $1")
            .bind(submission_id.to_string())
            .execute(&self.writer)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn set_category(
        &self,
        submission_id: SubmissionId,
        category: &Category,
    ) -> Result<bool, Self::Error> {
        let result = sqlx::query("update submissions set category = $1 where id = $2")
            .bind(category.as_str())
            .bind(submission_id.to_string())
            .execute(&self.writer)
            .await?;

        Ok(result.rows_affected() == 1)
    }
}
