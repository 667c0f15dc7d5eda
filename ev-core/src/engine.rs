//! Every operation here is a thin composition of the ports: validation and
//! the vote state machine are pure, so the only thing that can fail after
//! them is the backend, and the backend applies each write atomically.

use crate::{
    ContestError, Rejection,
    admission::Draft,
    models::{
        Category, CategoryFilter, CategoryRegistry, Direction, Map, SortOption, Submission,
        SubmissionId, Timestamp, VoteOutcome, VoterState, VoterToken, leaderboard as top, project,
    },
    ports::{ContestRepository, Recorded, Repository},
};
use tracing::{Level, event, instrument};

/// The result of a contest operation against the repository `R`.
pub type Outcome<T, R> = Result<T, ContestError<<R as Repository>::Error>>;

/// Apply one vote action from `voter` on `submission_id`.
///
/// The voter's current ledger entry is read, the transition table decides the
/// new entry and the aggregate delta, and the backend applies both at once.
/// Requesting the held direction retracts the vote; requesting the opposite
/// direction also only retracts it.
///
/// If the entry changed between the read and the write, the transition is
/// decided again from the entry the backend reports.
#[instrument(level = "debug", skip(repo))]
pub async fn apply_vote<R: ContestRepository>(
    repo: &R,
    submission_id: SubmissionId,
    voter: &VoterToken,
    direction: Direction,
) -> Outcome<VoteOutcome, R> {
    let mut current: VoterState = repo
        .get_vote(submission_id, voter)
        .await
        .map_err(ContestError::backend)?
        .into();

    loop {
        let (new_voter_state, delta) = current.transition(direction);

        let new_aggregate = match repo
            .record_vote(submission_id, voter, current, new_voter_state, delta)
            .await
            .map_err(ContestError::backend)?
        {
            Recorded::Applied(aggregate) => aggregate,
            Recorded::Missing => return Err(ContestError::NotFound(submission_id)),
            Recorded::Stale(actual) => {
                event!(Level::DEBUG, expected = ?current, ?actual, "vote raced, deciding again");
                current = actual;
                continue;
            }
        };

        event!(
            Level::DEBUG,
            from = ?current,
            to = ?new_voter_state,
            delta,
            new_aggregate
        );

        return Ok(VoteOutcome {
            new_aggregate,
            new_voter_state,
        });
    }
}

/// Validate and persist a new submission.
///
/// The draft is checked in order (link, caption, author, category) before the
/// store is asked whether the post was already submitted. The backend stores
/// an unseen category together with the submission, so a refused insert
/// leaves the category list alone.
#[instrument(level = "debug", skip(repo))]
pub async fn submit<R: ContestRepository>(
    repo: &R,
    draft: &Draft,
    id: SubmissionId,
    now: Timestamp,
) -> Outcome<Submission, R> {
    let valid = draft.validate()?;

    if repo
        .post_exists(&valid.external_post_id)
        .await
        .map_err(ContestError::backend)?
    {
        return Err(Rejection::DuplicatePost.into());
    }

    let submission = Submission {
        id,
        source_url: valid.source_url,
        external_post_id: valid.external_post_id,
        caption: valid.caption,
        category: valid.category,
        author: valid.author,
        created_at: now,
        vote_count: 0,
    };

    if !repo
        .insert_submission(&submission)
        .await
        .map_err(ContestError::backend)?
    {
        return Err(Rejection::DuplicatePost.into());
    }

    event!(
        Level::INFO,
        id = %submission.id,
        post = %submission.external_post_id,
        category = %submission.category,
        "submitted"
    );
    Ok(submission)
}

/// Look up a single submission.
pub async fn get_submission<R: ContestRepository>(
    repo: &R,
    submission_id: SubmissionId,
) -> Outcome<Submission, R> {
    repo.get_submission(submission_id)
        .await
        .map_err(ContestError::backend)?
        .ok_or(ContestError::NotFound(submission_id))
}

/// Delete a submission and purge its ledger rows.
#[instrument(level = "debug", skip(repo))]
pub async fn delete_submission<R: ContestRepository>(
    repo: &R,
    submission_id: SubmissionId,
) -> Outcome<(), R> {
    if repo
        .delete_submission(submission_id)
        .await
        .map_err(ContestError::backend)?
    {
        event!(Level::INFO, id = %submission_id, "deleted");
        Ok(())
    } else {
        Err(ContestError::NotFound(submission_id))
    }
}

/// Reassign the category of a submission, admitting the tag if it is new.
#[instrument(level = "debug", skip(repo))]
pub async fn set_category<R: ContestRepository>(
    repo: &R,
    submission_id: SubmissionId,
    raw: &str,
) -> Outcome<Category, R> {
    let category = Category::parse(raw).ok_or(Rejection::InvalidCategory)?;

    if !repo
        .set_category(submission_id, &category)
        .await
        .map_err(ContestError::backend)?
    {
        return Err(ContestError::NotFound(submission_id));
    }

    if !category.is_base() {
        repo.add_category(&category)
            .await
            .map_err(ContestError::backend)?;
    }

    Ok(category)
}

/// The active category registry: the base set plus every stored tag.
pub async fn list_categories<R: ContestRepository>(repo: &R) -> Outcome<CategoryRegistry, R> {
    let stored = repo
        .list_categories()
        .await
        .map_err(ContestError::backend)?;
    Ok(stored.into_iter().collect())
}

/// Add a tag to the registry.
///
/// Returns the normalized tag and whether it was new; a tag that is already
/// present (in any letter case) is silently ignored.
#[instrument(level = "debug", skip(repo))]
pub async fn add_category<R: ContestRepository>(repo: &R, raw: &str) -> Outcome<(Category, bool), R> {
    let category = Category::parse(raw).ok_or(Rejection::InvalidCategory)?;
    let added = if category.is_base() {
        false
    } else {
        repo.add_category(&category)
            .await
            .map_err(ContestError::backend)?
    };
    Ok((category, added))
}

/// Remove a tag from the registry.
///
/// Submissions carrying the tag keep it. Base categories cannot be removed,
/// which is reported as `false`.
#[instrument(level = "debug", skip(repo))]
pub async fn remove_category<R: ContestRepository>(
    repo: &R,
    raw: &str,
) -> Outcome<(Category, bool), R> {
    let category = Category::parse(raw).ok_or(Rejection::InvalidCategory)?;
    if category.is_base() {
        event!(Level::WARN, category = %category, "refusing to remove a base category");
        return Ok((category, false));
    }
    let removed = repo
        .remove_category(&category)
        .await
        .map_err(ContestError::backend)?;
    Ok((category, removed))
}

/// The filtered and sorted feed.
pub async fn feed<R: ContestRepository>(
    repo: &R,
    filter: &CategoryFilter,
    sort: SortOption,
) -> Outcome<Vec<Submission>, R> {
    let submissions = repo
        .list_submissions()
        .await
        .map_err(ContestError::backend)?;
    Ok(project(&submissions, filter, sort)
        .into_iter()
        .cloned()
        .collect())
}

/// The `size` highest-voted submissions across every category.
pub async fn leaderboard<R: ContestRepository>(repo: &R, size: usize) -> Outcome<Vec<Submission>, R> {
    let submissions = repo
        .list_submissions()
        .await
        .map_err(ContestError::backend)?;
    Ok(top(&submissions, size).into_iter().cloned().collect())
}

/// The ledger entries of one voter, keyed by submission.
pub async fn my_votes<R: ContestRepository>(
    repo: &R,
    voter: &VoterToken,
) -> Outcome<Map<SubmissionId, Direction>, R> {
    let records = repo.list_votes().await.map_err(ContestError::backend)?;
    Ok(crate::ledger::voter_states(&records, voter))
}
