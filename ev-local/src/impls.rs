use crate::{
    LocalError, LocalStore,
    document::{CATEGORIES_FILE, SUBMISSIONS_FILE, VOTES_FILE},
    stored_form,
};
use ev_core::{
    models::{
        Category, Direction, ExternalPostId, Submission, SubmissionId, VoteRecord, VoterState,
        VoterToken,
    },
    ports::{CategoryRepository, Recorded, Repository, SubmissionRepository, VoteRepository},
};
use tracing::{Level, event};

impl Repository for LocalStore {
    type Error = LocalError;
}

impl SubmissionRepository for LocalStore {
    async fn list_submissions(&self) -> Result<Vec<Submission>, Self::Error> {
        let documents = self.documents().lock().await;
        let mut submissions = documents.submissions.clone();
        submissions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(submissions)
    }

    async fn get_submission(
        &self,
        submission_id: SubmissionId,
    ) -> Result<Option<Submission>, Self::Error> {
        let documents = self.documents().lock().await;
        Ok(documents
            .submissions
            .iter()
            .find(|s| s.id == submission_id)
            .cloned())
    }

    async fn post_exists(&self, post_id: &ExternalPostId) -> Result<bool, Self::Error> {
        let documents = self.documents().lock().await;
        Ok(documents
            .submissions
            .iter()
            .any(|s| &s.external_post_id == post_id))
    }

    async fn insert_submission(&self, submission: &Submission) -> Result<bool, Self::Error> {
        let mut documents = self.documents().lock().await;
        if documents
            .submissions
            .iter()
            .any(|s| s.external_post_id == submission.external_post_id)
        {
            return Ok(false);
        }

        let mut next = Vec::with_capacity(documents.submissions.len() + 1);
        next.push(submission.clone());
        next.extend(documents.submissions.iter().cloned());

        let tag = &submission.category;
        if tag.is_base() || documents.categories.contains(tag) {
            self.write(SUBMISSIONS_FILE, &stored_form(&next)).await?;
            documents.submissions = next;
            return Ok(true);
        }

        let mut categories = documents.categories.clone();
        categories.push(tag.clone());

        self.write_both(
            (
                SUBMISSIONS_FILE,
                &stored_form(&next),
                &stored_form(&documents.submissions),
            ),
            (CATEGORIES_FILE, &categories),
        )
        .await?;
        documents.submissions = next;
        documents.categories = categories;
        event!(Level::INFO, category = %tag, "new category");
        Ok(true)
    }

    async fn delete_submission(&self, submission_id: SubmissionId) -> Result<bool, Self::Error> {
        let mut documents = self.documents().lock().await;
        if !documents.submissions.iter().any(|s| s.id == submission_id) {
            return Ok(false);
        }

        let submissions: Vec<Submission> = documents
            .submissions
            .iter()
            .filter(|s| s.id != submission_id)
            .cloned()
            .collect();
        let mut votes = documents.votes.clone();
        for mine in votes.values_mut() {
            mine.shift_remove(&submission_id);
        }
        votes.retain(|_, mine| !mine.is_empty());

        self.write_both(
            (VOTES_FILE, &votes, &documents.votes),
            (SUBMISSIONS_FILE, &stored_form(&submissions)),
        )
        .await?;
        documents.submissions = submissions;
        documents.votes = votes;
        Ok(true)
    }

    async fn set_category(
        &self,
        submission_id: SubmissionId,
        category: &Category,
    ) -> Result<bool, Self::Error> {
        let mut documents = self.documents().lock().await;
        let mut submissions = documents.submissions.clone();
        let Some(target) = submissions.iter_mut().find(|s| s.id == submission_id) else {
            return Ok(false);
        };
        target.category = category.clone();

        self.write(SUBMISSIONS_FILE, &stored_form(&submissions))
            .await?;
        documents.submissions = submissions;
        Ok(true)
    }
}

impl VoteRepository for LocalStore {
    async fn list_votes(&self) -> Result<Vec<VoteRecord>, Self::Error> {
        let documents = self.documents().lock().await;
        Ok(documents
            .votes
            .iter()
            .flat_map(|(voter, mine)| {
                mine.iter().map(|(submission_id, direction)| VoteRecord {
                    submission_id: *submission_id,
                    voter: voter.clone(),
                    direction: *direction,
                })
            })
            .collect())
    }

    async fn get_vote(
        &self,
        submission_id: SubmissionId,
        voter: &VoterToken,
    ) -> Result<Option<Direction>, Self::Error> {
        let documents = self.documents().lock().await;
        Ok(documents
            .votes
            .get(voter)
            .and_then(|mine| mine.get(&submission_id))
            .copied())
    }

    async fn record_vote(
        &self,
        submission_id: SubmissionId,
        voter: &VoterToken,
        expected: VoterState,
        state: VoterState,
        delta: i64,
    ) -> Result<Recorded, Self::Error> {
        let mut documents = self.documents().lock().await;

        let mut submissions = documents.submissions.clone();
        let Some(target) = submissions.iter_mut().find(|s| s.id == submission_id) else {
            return Ok(Recorded::Missing);
        };

        let current: VoterState = documents
            .votes
            .get(voter)
            .and_then(|mine| mine.get(&submission_id))
            .copied()
            .into();
        if current != expected {
            return Ok(Recorded::Stale(current));
        }

        target.vote_count += delta;
        let aggregate = target.vote_count;

        let mut votes = documents.votes.clone();
        match state.direction() {
            Some(direction) => {
                votes
                    .entry(voter.clone())
                    .or_default()
                    .insert(submission_id, direction);
            }
            None => {
                if let Some(mine) = votes.get_mut(voter) {
                    mine.shift_remove(&submission_id);
                    if mine.is_empty() {
                        votes.shift_remove(voter);
                    }
                }
            }
        }

        self.write_both(
            (VOTES_FILE, &votes, &documents.votes),
            (SUBMISSIONS_FILE, &stored_form(&submissions)),
        )
        .await?;
        documents.submissions = submissions;
        documents.votes = votes;
        Ok(Recorded::Applied(aggregate))
    }
}

impl CategoryRepository for LocalStore {
    async fn list_categories(&self) -> Result<Vec<Category>, Self::Error> {
        Ok(self.documents().lock().await.categories.clone())
    }

    async fn add_category(&self, category: &Category) -> Result<bool, Self::Error> {
        let mut documents = self.documents().lock().await;
        if documents.categories.contains(category) {
            return Ok(false);
        }
        let mut categories = documents.categories.clone();
        categories.push(category.clone());

        self.write(CATEGORIES_FILE, &categories).await?;
        documents.categories = categories;
        Ok(true)
    }

    async fn remove_category(&self, category: &Category) -> Result<bool, Self::Error> {
        let mut documents = self.documents().lock().await;
        if !documents.categories.contains(category) {
            return Ok(false);
        }
        let categories: Vec<Category> = documents
            .categories
            .iter()
            .filter(|c| *c != category)
            .cloned()
            .collect();

        self.write(CATEGORIES_FILE, &categories).await?;
        documents.categories = categories;
        Ok(true)
    }
}
