#![allow(dead_code)]

use ev_core::{
    admission::Draft,
    ledger,
    models::{
        Category, Direction, ExternalPostId, Submission, SubmissionId, VoteRecord, VoterState,
        VoterToken,
    },
    ports::{CategoryRepository, Recorded, Repository, SubmissionRepository, VoteRepository},
};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};

#[derive(Debug, thiserror::Error)]
#[error("backend offline")]
pub struct Offline;

#[derive(Default)]
struct State {
    submissions: Vec<Submission>,
    votes: Vec<VoteRecord>,
    categories: Vec<Category>,
}

/// A shared, in-memory backend that recomputes aggregates from the ledger
/// on every read, and can be switched offline to exercise failure paths.
#[derive(Clone, Default)]
pub struct MemoryRepo {
    state: Arc<Mutex<State>>,
    offline: Arc<AtomicBool>,
    blind: Arc<AtomicBool>,
}

impl MemoryRepo {
    pub fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    pub fn go_online(&self) {
        self.offline.store(false, Ordering::SeqCst);
    }

    /// Make `get_vote` report no entry, as if another device voted between
    /// the read and the write.
    pub fn read_stale_votes(&self) {
        self.blind.store(true, Ordering::SeqCst);
    }

    pub fn vote_rows(&self) -> usize {
        self.state.lock().unwrap().votes.len()
    }

    fn check(&self) -> Result<(), Offline> {
        if self.offline.load(Ordering::SeqCst) {
            Err(Offline)
        } else {
            Ok(())
        }
    }

    fn with_aggregate(state: &State, mut submission: Submission) -> Submission {
        submission.vote_count = ledger::tally(&state.votes)
            .get(&submission.id)
            .copied()
            .unwrap_or(0);
        submission
    }
}

impl Repository for MemoryRepo {
    type Error = Offline;
}

impl SubmissionRepository for MemoryRepo {
    async fn list_submissions(&self) -> Result<Vec<Submission>, Self::Error> {
        self.check()?;
        let state = self.state.lock().unwrap();
        let mut all: Vec<Submission> = state
            .submissions
            .iter()
            .cloned()
            .map(|s| Self::with_aggregate(&state, s))
            .collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn get_submission(&self, id: SubmissionId) -> Result<Option<Submission>, Self::Error> {
        self.check()?;
        let state = self.state.lock().unwrap();
        Ok(state
            .submissions
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .map(|s| Self::with_aggregate(&state, s)))
    }

    async fn post_exists(&self, post_id: &ExternalPostId) -> Result<bool, Self::Error> {
        self.check()?;
        let state = self.state.lock().unwrap();
        Ok(state.submissions.iter().any(|s| &s.external_post_id == post_id))
    }

    async fn insert_submission(&self, submission: &Submission) -> Result<bool, Self::Error> {
        self.check()?;
        let mut state = self.state.lock().unwrap();
        if state
            .submissions
            .iter()
            .any(|s| s.external_post_id == submission.external_post_id)
        {
            return Ok(false);
        }
        state.submissions.push(submission.clone());
        let tag = &submission.category;
        if !tag.is_base() && !state.categories.contains(tag) {
            state.categories.push(tag.clone());
        }
        Ok(true)
    }

    async fn delete_submission(&self, id: SubmissionId) -> Result<bool, Self::Error> {
        self.check()?;
        let mut state = self.state.lock().unwrap();
        let before = state.submissions.len();
        state.submissions.retain(|s| s.id != id);
        state.votes.retain(|v| v.submission_id != id);
        Ok(state.submissions.len() != before)
    }

    async fn set_category(&self, id: SubmissionId, category: &Category) -> Result<bool, Self::Error> {
        self.check()?;
        let mut state = self.state.lock().unwrap();
        match state.submissions.iter_mut().find(|s| s.id == id) {
            Some(submission) => {
                submission.category = category.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl VoteRepository for MemoryRepo {
    async fn list_votes(&self) -> Result<Vec<VoteRecord>, Self::Error> {
        self.check()?;
        Ok(self.state.lock().unwrap().votes.clone())
    }

    async fn get_vote(
        &self,
        id: SubmissionId,
        voter: &VoterToken,
    ) -> Result<Option<Direction>, Self::Error> {
        self.check()?;
        if self.blind.load(Ordering::SeqCst) {
            return Ok(None);
        }
        let state = self.state.lock().unwrap();
        Ok(state
            .votes
            .iter()
            .find(|v| v.submission_id == id && &v.voter == voter)
            .map(|v| v.direction))
    }

    async fn record_vote(
        &self,
        id: SubmissionId,
        voter: &VoterToken,
        expected: VoterState,
        new_state: VoterState,
        _delta: i64,
    ) -> Result<Recorded, Self::Error> {
        self.check()?;
        let mut state = self.state.lock().unwrap();
        if !state.submissions.iter().any(|s| s.id == id) {
            return Ok(Recorded::Missing);
        }
        let current: VoterState = state
            .votes
            .iter()
            .find(|v| v.submission_id == id && &v.voter == voter)
            .map(|v| v.direction)
            .into();
        if current != expected {
            return Ok(Recorded::Stale(current));
        }
        state
            .votes
            .retain(|v| !(v.submission_id == id && &v.voter == voter));
        if let Some(direction) = new_state.direction() {
            state.votes.push(VoteRecord {
                submission_id: id,
                voter: voter.clone(),
                direction,
            });
        }
        Ok(Recorded::Applied(
            ledger::tally(&state.votes).get(&id).copied().unwrap_or(0),
        ))
    }
}

impl CategoryRepository for MemoryRepo {
    async fn list_categories(&self) -> Result<Vec<Category>, Self::Error> {
        self.check()?;
        Ok(self.state.lock().unwrap().categories.clone())
    }

    async fn add_category(&self, category: &Category) -> Result<bool, Self::Error> {
        self.check()?;
        let mut state = self.state.lock().unwrap();
        if state.categories.contains(category) {
            Ok(false)
        } else {
            state.categories.push(category.clone());
            Ok(true)
        }
    }

    async fn remove_category(&self, category: &Category) -> Result<bool, Self::Error> {
        self.check()?;
        let mut state = self.state.lock().unwrap();
        let before = state.categories.len();
        state.categories.retain(|c| c != category);
        Ok(state.categories.len() != before)
    }
}

pub fn draft(post: u64, category: &str) -> Draft {
    Draft {
        source_url: format!("https://x.com/editor/status/{post}"),
        caption: format!("edit #{post}"),
        author: "@editor".to_owned(),
        category: category.to_owned(),
    }
}

pub fn voter(name: &str) -> VoterToken {
    name.parse().unwrap()
}
