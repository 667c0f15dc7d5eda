use crate::{
    admission::Draft,
    engine::{self, Outcome},
    models::{
        Category, CategoryFilter, CategoryRegistry, Direction, Map, SortOption, Submission,
        SubmissionId, Timestamp, VoteOutcome, VoterState, VoterToken, leaderboard, project,
    },
    ports::ContestRepository,
};
use tracing::{Level, event};

/// One device's view of the contest.
///
/// A session holds a snapshot of the submissions, the device's own ledger
/// entries and the category registry. [`Session::refresh`] replaces the whole
/// snapshot with what the backend currently holds; the mutating operations
/// patch only what they touched, and a subsequent refresh reconciles them
/// with the activity of every other voter. A failed operation leaves the
/// snapshot as it was.
pub struct Session<R> {
    repo: R,
    voter: VoterToken,
    submissions: Vec<Submission>,
    my_votes: Map<SubmissionId, Direction>,
    categories: CategoryRegistry,
    filter: CategoryFilter,
    sort: SortOption,
}

impl<R: ContestRepository> Session<R> {
    /// An empty session; call [`Session::refresh`] to load the snapshot.
    pub fn new(repo: R, voter: VoterToken) -> Self {
        Self {
            repo,
            voter,
            submissions: Vec::new(),
            my_votes: Map::default(),
            categories: CategoryRegistry::default(),
            filter: CategoryFilter::All,
            sort: SortOption::default(),
        }
    }

    /// Open a session and load its first snapshot.
    pub async fn open(repo: R, voter: VoterToken) -> Outcome<Self, R> {
        let mut session = Self::new(repo, voter);
        session.refresh().await?;
        Ok(session)
    }

    /// Replace the snapshot with the backend's current state.
    pub async fn refresh(&mut self) -> Outcome<(), R> {
        let submissions = self
            .repo
            .list_submissions()
            .await
            .map_err(crate::ContestError::backend)?;
        let my_votes = engine::my_votes(&self.repo, &self.voter).await?;
        let categories = engine::list_categories(&self.repo).await?;

        event!(
            Level::DEBUG,
            submissions = submissions.len(),
            votes = my_votes.len(),
            categories = categories.len(),
            "refreshed"
        );

        self.submissions = submissions;
        self.my_votes = my_votes;
        self.categories = categories;
        Ok(())
    }

    /// Vote on a submission and patch the snapshot with the outcome.
    pub async fn vote(
        &mut self,
        submission_id: SubmissionId,
        direction: Direction,
    ) -> Outcome<VoteOutcome, R> {
        let outcome = engine::apply_vote(&self.repo, submission_id, &self.voter, direction).await?;

        if let Some(submission) = self.find_mut(submission_id) {
            submission.vote_count = outcome.new_aggregate;
        }
        match outcome.new_voter_state.direction() {
            Some(direction) => {
                self.my_votes.insert(submission_id, direction);
            }
            None => {
                self.my_votes.shift_remove(&submission_id);
            }
        }
        Ok(outcome)
    }

    /// Submit a new entry; on success it is prepended to the snapshot.
    pub async fn submit(&mut self, draft: &Draft) -> Outcome<Submission, R> {
        let submission =
            engine::submit(&self.repo, draft, SubmissionId::random(), Timestamp::now()).await?;
        self.categories.add(submission.category.clone());
        self.submissions.insert(0, submission.clone());
        Ok(submission)
    }

    /// Delete a submission (admin).
    pub async fn delete(&mut self, submission_id: SubmissionId) -> Outcome<(), R> {
        engine::delete_submission(&self.repo, submission_id).await?;
        self.submissions.retain(|s| s.id != submission_id);
        self.my_votes.shift_remove(&submission_id);
        Ok(())
    }

    /// Reassign the category of a submission (admin).
    pub async fn set_category(
        &mut self,
        submission_id: SubmissionId,
        raw: &str,
    ) -> Outcome<Category, R> {
        let category = engine::set_category(&self.repo, submission_id, raw).await?;
        self.categories.add(category.clone());
        if let Some(submission) = self.find_mut(submission_id) {
            submission.category = category.clone();
        }
        Ok(category)
    }

    /// Add a category to the registry (admin).
    pub async fn add_category(&mut self, raw: &str) -> Outcome<bool, R> {
        let (category, _) = engine::add_category(&self.repo, raw).await?;
        Ok(self.categories.add(category))
    }

    /// Remove a category from the registry (admin).
    ///
    /// If the removed tag is the active filter, the filter falls back to
    /// [`CategoryFilter::All`].
    pub async fn remove_category(&mut self, raw: &str) -> Outcome<bool, R> {
        let (category, removed) = engine::remove_category(&self.repo, raw).await?;
        if !category.is_base() {
            self.categories.remove(&category);
            if self.filter == CategoryFilter::Only(category) {
                self.filter = CategoryFilter::All;
            }
        }
        Ok(removed)
    }

    /// Change the category filter of the feed
    pub fn select_category(&mut self, filter: CategoryFilter) {
        self.filter = filter;
    }

    /// Change the ordering of the feed
    pub fn set_sort(&mut self, sort: SortOption) {
        self.sort = sort;
    }

    /// The snapshot, filtered and sorted
    pub fn feed(&self) -> Vec<&Submission> {
        project(&self.submissions, &self.filter, self.sort)
    }

    /// The top `size` of the snapshot, regardless of the filter
    pub fn leaderboard(&self, size: usize) -> Vec<&Submission> {
        leaderboard(&self.submissions, size)
    }

    /// This device's state on a submission
    pub fn my_vote(&self, submission_id: SubmissionId) -> VoterState {
        self.my_votes.get(&submission_id).copied().into()
    }

    /// The device's token
    pub fn voter(&self) -> &VoterToken {
        &self.voter
    }

    /// The submissions in the snapshot, in backend order
    pub fn submissions(&self) -> &[Submission] {
        &self.submissions
    }

    /// The category registry of the snapshot
    pub fn categories(&self) -> &CategoryRegistry {
        &self.categories
    }

    /// The active filter
    pub fn filter(&self) -> &CategoryFilter {
        &self.filter
    }

    /// The active ordering
    pub fn sort(&self) -> SortOption {
        self.sort
    }

    /// The backend
    pub fn repository(&self) -> &R {
        &self.repo
    }

    fn find_mut(&mut self, submission_id: SubmissionId) -> Option<&mut Submission> {
        self.submissions.iter_mut().find(|s| s.id == submission_id)
    }
}
