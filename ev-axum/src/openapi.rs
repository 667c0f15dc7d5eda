//! The OpenAPI document of the contest and the page that renders it.
//!
//! The document is generated by aide from the routes themselves, so the
//! tags below only add prose. `/docs` serves a RapiDoc page that lets an
//! admin paste a token and try the protected endpoints.

use std::sync::Arc;

use aide::{
    axum::{ApiRouter, IntoApiResponse, routing::get},
    openapi::{OpenApi, SecurityScheme, Tag},
    transform::TransformOpenApi,
};
use axum::{
    Extension, Json,
    response::{Html, IntoResponse},
};

/// The security scheme name referenced by admin operations
pub(crate) const ADMIN_SCHEME: &str = "jwt";

/// Tags in the order the documentation lists them
const TAGS: [(&str, &str); 5] = [
    ("submission", "Submitting, browsing and moderating entries"),
    ("vote", "Up- and down-votes; a repeated or opposite vote retracts"),
    ("category", "The category registry: the base set plus every tag in use"),
    ("admin", "Operations requiring a bearer token with `admin: true`"),
    ("health", "Liveness"),
];

const RAPIDOC: &str = r#"<!doctype html>
<html>
  <head>
    <meta charset="utf-8">
    <title>Yılın Editi API</title>
    <script src="https://cdnjs.cloudflare.com/ajax/libs/rapidoc/9.3.8/rapidoc-min.js" integrity="sha512-0ES6eX4K9J1PrIEjIizv79dTlN5HwI2GW9Ku6ymb8dijMHF5CIplkS8N0iFJ/wl3GybCSqBJu8HDhiFkZRAf0g==" crossorigin="anonymous" referrerpolicy="no-referrer"></script>
  </head>
  <body>
    <rapi-doc spec-url="/docs/api.json"
        render-style="focused"
        allow-authentication="true"
        show-method-in-nav-bar="as-colored-text"
        use-path-in-nav-bar="true"
    ></rapi-doc>
  </body>
</html>"#;

async fn serve_rapidoc() -> impl IntoApiResponse {
    Html(RAPIDOC).into_response()
}

/// The raw document, for client generators.
async fn serve_docs(Extension(api): Extension<Arc<OpenApi>>) -> impl IntoApiResponse {
    Json(api).into_response()
}

/// Routes under `/docs`: the rendered page and `api.json`.
pub(crate) fn docs_routes() -> ApiRouter {
    ApiRouter::new()
        .route("/", get(serve_rapidoc))
        .route("/api.json", get(serve_docs))
}

/// Document metadata, the admin security scheme and the tag descriptions.
pub(crate) fn api_docs(api: TransformOpenApi) -> TransformOpenApi {
    let api = api
        .title("Edit of the Year API")
        .summary("Submit, vote on and rank video edits.")
        .description(
            "Submissions link to posts with a caption, an author and a category. \
             Every device votes with its own token; the feed and the leaderboard \
             are ranked by the net vote total.",
        )
        .version(env!("CARGO_PKG_VERSION"))
        .security_scheme(
            ADMIN_SCHEME,
            SecurityScheme::Http {
                scheme: "bearer".into(),
                bearer_format: Some("JWT".into()),
                description: Some("An HS256 token carrying `admin: true`".into()),
                extensions: Default::default(),
            },
        );

    TAGS.into_iter().fold(api, |api, (name, description)| {
        api.tag(Tag {
            name: name.into(),
            description: Some(description.into()),
            ..Default::default()
        })
    })
}
