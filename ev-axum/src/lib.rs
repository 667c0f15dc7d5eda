#![warn(missing_docs)]
//! A REST API for the contest, over any backend implementing the ports of
//! [`ev_core`].
//!
//! Anybody may browse, submit and vote; a vote is attributed to the voter
//! token sent along with it. Deleting submissions, reassigning their category
//! and managing the category list require a bearer token that
//! [`Application::is_admin`] accepts.

mod category_routes;
mod submission_routes;

use aide::{
    axum::{ApiRouter, routing::get_with},
    openapi::OpenApi,
};
use axum::{
    Extension, Json,
    extract::{Query, State},
    http::{StatusCode, header},
};
use axum_extra::TypedHeader;
use ev_core::{
    ContestError, Rejection, engine,
    models::Submission,
    ports::{Application, ContestRepository},
};
use headers::{Authorization, authorization::Bearer};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::{fmt::Display, sync::Arc};
use tower_http::cors;
use tracing::{Level, event};

mod openapi;
use openapi::{api_docs, docs_routes};

pub mod config;
use config::AxumConfig;

/// Response for the health check endpoint
#[derive(Serialize, JsonSchema)]
#[schemars(inline)]
struct HealthResponse {
    status: String,
}

/// Simple health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Query parameters of the leaderboard
#[derive(Deserialize, JsonSchema)]
struct LeaderboardQuery {
    /// How many entries to return (capped by the server's configuration)
    size: Option<usize>,
}

/// The highest-voted submissions across every category.
///
/// # Returns
///
/// - `200 OK`: At most `size` submissions, highest aggregate first
/// - `500 Internal Server Error`: The backend failed
async fn leaderboard<T: ApiApplication>(
    State(app): State<T>,
    Extension(config): Extension<Arc<AxumConfig>>,
    Query(LeaderboardQuery { size }): Query<LeaderboardQuery>,
) -> Result<Json<Vec<Submission>>, (StatusCode, String)> {
    let size = size
        .unwrap_or(config.leaderboard_size)
        .min(config.leaderboard_size);
    engine::leaderboard(app.database(), size)
        .await
        .map(Json)
        .map_err(contest_error)
}

/// Construct a full API router with the given state and config
pub fn router<T: ApiApplication>(state: T, config: AxumConfig) -> axum::Router {
    // Browsers poll this API from the page embedding the contest, so any
    // origin may call it; only the bearer header carries authorization.
    let policy = cors::CorsLayer::new()
        .allow_origin(cors::Any)
        .allow_methods(cors::Any)
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let mut api = OpenApi::default();
    ApiRouter::new()
        .api_route("/health", get_with(health_check, |op| op.tag("health")))
        .api_route(
            "/leaderboard",
            get_with(leaderboard::<T>, |op| op.tag("submission")),
        )
        .nest("/submission", submission_routes::router())
        .nest("/category", category_routes::router())
        .nest_api_service("/docs", docs_routes())
        .finish_api_with(&mut api, api_docs)
        .layer(Extension(Arc::new(api))) // Arc is very important here or you will face massive memory and performance issues
        .layer(Extension(Arc::new(config)))
        .layer(policy)
        .with_state(state)
}

/// Starts the HTTP server with the provided configuration
pub async fn start_server<T: ApiApplication>(
    config: AxumConfig,
    app: T,
) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;

    event!(
        Level::INFO,
        "Listening for requests on {}",
        listener.local_addr()?
    );

    let service = router(app, config);
    axum::serve(listener, service).await
}

/// Axum imposes all sorts of constraints on what can pass for state. This
/// trait, coupled with a blanket implementation, specifies it all upfront and
/// in one place. If a function takes a generic `T: ApiApplication`, then
/// everything one might reasonably want to do should work.
pub trait ApiApplication:
    Clone
    + Send
    + Sync
    + 'static
    + Application<
        Context = Authorization<Bearer>,
        Repository: Clone + Send + Sync + 'static + ContestRepository,
    >
{
}

// this is the blanket implementation
impl<T: Clone + Send + Sync + 'static> ApiApplication for T where
    T: Application<
            Context = Authorization<Bearer>,
            Repository: Clone + Send + Sync + 'static + ContestRepository,
        >
{
}

/// Fail with `401 Unauthorized` unless the request carries an admin token.
pub(crate) async fn require_admin<T: ApiApplication>(
    app: &T,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
) -> Result<(), (StatusCode, String)> {
    match auth {
        Some(TypedHeader(auth)) if app.is_admin(&auth).await => Ok(()),
        _ => Err((StatusCode::UNAUTHORIZED, "not authorized".to_string())),
    }
}

/// Map a contest failure onto a status code and a message.
///
/// Backend failures are logged and reported without detail.
pub(crate) fn contest_error<E: Display>(err: ContestError<E>) -> (StatusCode, String) {
    match err {
        ContestError::Rejected(Rejection::DuplicatePost) => {
            (StatusCode::CONFLICT, Rejection::DuplicatePost.to_string())
        }
        ContestError::Rejected(rejection) => (StatusCode::BAD_REQUEST, rejection.to_string()),
        ContestError::NotFound(id) => (StatusCode::NOT_FOUND, format!("unknown submission {id}")),
        ContestError::BackendUnavailable(err) => {
            event!(Level::ERROR, err = err.to_string());
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "backend unavailable".to_string(),
            )
        }
    }
}
