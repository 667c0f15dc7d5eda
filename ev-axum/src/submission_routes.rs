//! REST API endpoints for submissions and votes.

use crate::{ApiApplication, contest_error, openapi::ADMIN_SCHEME, require_admin};
use aide::axum::{
    ApiRouter,
    routing::{get_with, post_with, put_with},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use axum_extra::TypedHeader;
use ev_core::{
    admission::Draft,
    engine,
    models::{
        CategoryFilter, Direction, SortOption, Submission, SubmissionId, VoteOutcome, VoterState,
        VoterToken,
    },
    ports::Application as _,
};
use headers::{Authorization, authorization::Bearer};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Path parameter for submission-specific endpoints.
#[derive(Deserialize, JsonSchema)]
struct Id {
    /// The unique identifier of the submission
    submission_id: SubmissionId,
}

/// Query parameters of the feed
#[derive(Deserialize, JsonSchema)]
struct FeedQuery {
    /// A category tag, or `all` (the default)
    #[serde(default)]
    category: CategoryFilter,
    /// `trending` (the default), `newest` or `top`
    #[serde(default)]
    sort: SortOption,
    /// The caller's voter token, to report their own vote on each entry
    voter: Option<VoterToken>,
}

/// A feed entry: the submission plus the caller's vote on it
#[derive(Serialize, JsonSchema)]
struct FeedEntry {
    #[serde(flatten)]
    submission: Submission,
    /// The caller's current vote, `none` without a voter token
    my_vote: VoterState,
}

/// Body of a vote request
#[derive(Deserialize, JsonSchema)]
struct VoteBody {
    /// The voting device's token
    voter: VoterToken,
    /// The requested direction
    direction: Direction,
}

/// Body of a category reassignment
#[derive(Deserialize, JsonSchema)]
struct CategoryBody {
    /// The new category tag
    category: String,
}

/// Creates a router with submission-related endpoints.
pub fn router<T: ApiApplication>() -> ApiRouter<T> {
    ApiRouter::new()
        .api_route(
            "/",
            get_with(list_submissions::<T>, |op| op.tag("submission"))
                .post_with(create_submission::<T>, |op| op.tag("submission")),
        )
        .api_route(
            "/{submission_id}",
            get_with(get_submission::<T>, |op| op.tag("submission")).delete_with(
                delete_submission::<T>,
                |op| op.tag("submission").tag("admin").security_requirement(ADMIN_SCHEME),
            ),
        )
        .api_route(
            "/{submission_id}/category",
            put_with(set_category::<T>, |op| {
                op.tag("submission").tag("admin").security_requirement(ADMIN_SCHEME)
            }),
        )
        .api_route(
            "/{submission_id}/vote",
            post_with(vote::<T>, |op| op.tag("vote")),
        )
}

/// The feed: filtered by category, then sorted.
///
/// # Returns
///
/// - `200 OK`: The matching submissions, each with the caller's vote
/// - `500 Internal Server Error`: The backend failed
async fn list_submissions<T: ApiApplication>(
    State(app): State<T>,
    Query(query): Query<FeedQuery>,
) -> Result<Json<Vec<FeedEntry>>, (StatusCode, String)> {
    let db = app.database();
    let submissions = engine::feed(db, &query.category, query.sort)
        .await
        .map_err(contest_error)?;

    let mine = match &query.voter {
        Some(voter) => engine::my_votes(db, voter).await.map_err(contest_error)?,
        None => Default::default(),
    };

    Ok(Json(
        submissions
            .into_iter()
            .map(|submission| FeedEntry {
                my_vote: mine.get(&submission.id).copied().into(),
                submission,
            })
            .collect(),
    ))
}

/// Submit a new entry.
///
/// # Returns
///
/// - `201 Created`: The stored submission
/// - `400 Bad Request`: The link, caption, author or category was refused
/// - `409 Conflict`: The post was already submitted
/// - `500 Internal Server Error`: The backend failed
async fn create_submission<T: ApiApplication>(
    State(app): State<T>,
    Json(draft): Json<Draft>,
) -> Result<(StatusCode, Json<Submission>), (StatusCode, String)> {
    let id = app.generate_submission_id();
    let now = app.now();
    engine::submit(app.database(), &draft, id, now)
        .await
        .map(|submission| (StatusCode::CREATED, Json(submission)))
        .map_err(contest_error)
}

/// Retrieve a single submission.
///
/// # Returns
///
/// - `200 OK`: The submission
/// - `404 Not Found`: Submission does not exist
/// - `500 Internal Server Error`: The backend failed
async fn get_submission<T: ApiApplication>(
    State(app): State<T>,
    Path(Id { submission_id }): Path<Id>,
) -> Result<Json<Submission>, (StatusCode, String)> {
    engine::get_submission(app.database(), submission_id)
        .await
        .map(Json)
        .map_err(contest_error)
}

/// Delete a submission along with its votes.
///
/// # Authorization
///
/// Requires an admin token.
///
/// # Returns
///
/// - `204 No Content`: Submission deleted
/// - `401 Unauthorized`: Not an admin
/// - `404 Not Found`: Submission does not exist
/// - `500 Internal Server Error`: The backend failed
async fn delete_submission<T: ApiApplication>(
    State(app): State<T>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    Path(Id { submission_id }): Path<Id>,
) -> Result<StatusCode, (StatusCode, String)> {
    require_admin(&app, auth).await?;
    engine::delete_submission(app.database(), submission_id)
        .await
        .map(|()| StatusCode::NO_CONTENT)
        .map_err(contest_error)
}

/// Reassign the category of a submission.
///
/// # Authorization
///
/// Requires an admin token.
///
/// # Returns
///
/// - `200 OK`: The updated submission
/// - `400 Bad Request`: The category is empty
/// - `401 Unauthorized`: Not an admin
/// - `404 Not Found`: Submission does not exist
/// - `500 Internal Server Error`: The backend failed
async fn set_category<T: ApiApplication>(
    State(app): State<T>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    Path(Id { submission_id }): Path<Id>,
    Json(CategoryBody { category }): Json<CategoryBody>,
) -> Result<Json<Submission>, (StatusCode, String)> {
    require_admin(&app, auth).await?;
    let db = app.database();
    engine::set_category(db, submission_id, &category)
        .await
        .map_err(contest_error)?;
    engine::get_submission(db, submission_id)
        .await
        .map(Json)
        .map_err(contest_error)
}

/// Vote on a submission.
///
/// Requesting the direction already held retracts the vote. Requesting the
/// opposite direction also only retracts it; a second request is needed to
/// cast the opposite vote.
///
/// # Returns
///
/// - `200 OK`: The new aggregate and the voter's new state
/// - `404 Not Found`: Submission does not exist
/// - `500 Internal Server Error`: The backend failed
async fn vote<T: ApiApplication>(
    State(app): State<T>,
    Path(Id { submission_id }): Path<Id>,
    Json(VoteBody { voter, direction }): Json<VoteBody>,
) -> Result<Json<VoteOutcome>, (StatusCode, String)> {
    engine::apply_vote(app.database(), submission_id, &voter, direction)
        .await
        .map(Json)
        .map_err(contest_error)
}
