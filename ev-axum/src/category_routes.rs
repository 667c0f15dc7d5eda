//! REST API endpoints for the category registry.

use crate::{ApiApplication, contest_error, openapi::ADMIN_SCHEME, require_admin};
use aide::axum::{
    ApiRouter,
    routing::{delete_with, get_with},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::TypedHeader;
use ev_core::{
    engine,
    models::Category,
    ports::Application as _,
};
use headers::{Authorization, authorization::Bearer};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A category as presented to clients
#[derive(Serialize, JsonSchema)]
struct CategoryEntry {
    /// The normalized tag
    name: Category,
    /// The tag, capitalized for display
    display_name: String,
    /// Whether the tag is one of the permanent base categories
    base: bool,
}

impl From<Category> for CategoryEntry {
    fn from(name: Category) -> Self {
        Self {
            display_name: name.display_name(),
            base: name.is_base(),
            name,
        }
    }
}

/// Body of a category creation
#[derive(Deserialize, JsonSchema)]
struct NewCategory {
    /// The tag to add; it is trimmed and lower-cased
    name: String,
}

/// Path parameter for category-specific endpoints.
#[derive(Deserialize, JsonSchema)]
struct Name {
    /// The tag
    name: String,
}

/// Creates a router with category-related endpoints.
pub fn router<T: ApiApplication>() -> ApiRouter<T> {
    ApiRouter::new()
        .api_route(
            "/",
            get_with(list_categories::<T>, |op| op.tag("category")).post_with(
                add_category::<T>,
                |op| op.tag("category").tag("admin").security_requirement(ADMIN_SCHEME),
            ),
        )
        .api_route(
            "/{name}",
            delete_with(remove_category::<T>, |op| {
                op.tag("category").tag("admin").security_requirement(ADMIN_SCHEME)
            }),
        )
}

/// The active categories, base set first.
///
/// # Returns
///
/// - `200 OK`: Every active category
/// - `500 Internal Server Error`: The backend failed
async fn list_categories<T: ApiApplication>(
    State(app): State<T>,
) -> Result<Json<Vec<CategoryEntry>>, (StatusCode, String)> {
    let registry = engine::list_categories(app.database())
        .await
        .map_err(contest_error)?;
    Ok(Json(
        Vec::<Category>::from(registry)
            .into_iter()
            .map(CategoryEntry::from)
            .collect(),
    ))
}

/// Add a category.
///
/// # Authorization
///
/// Requires an admin token.
///
/// # Returns
///
/// - `201 Created`: The category was added
/// - `200 OK`: The category already existed
/// - `400 Bad Request`: The name is empty or reserved
/// - `401 Unauthorized`: Not an admin
/// - `500 Internal Server Error`: The backend failed
async fn add_category<T: ApiApplication>(
    State(app): State<T>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    Json(NewCategory { name }): Json<NewCategory>,
) -> Result<(StatusCode, Json<CategoryEntry>), (StatusCode, String)> {
    require_admin(&app, auth).await?;
    let (category, added) = engine::add_category(app.database(), &name)
        .await
        .map_err(contest_error)?;
    let status = if added {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(category.into())))
}

/// Remove a category.
///
/// Submissions filed under the category keep it.
///
/// # Authorization
///
/// Requires an admin token.
///
/// # Returns
///
/// - `204 No Content`: The category was removed
/// - `401 Unauthorized`: Not an admin
/// - `404 Not Found`: No such category
/// - `409 Conflict`: Base categories cannot be removed
/// - `500 Internal Server Error`: The backend failed
async fn remove_category<T: ApiApplication>(
    State(app): State<T>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    Path(Name { name }): Path<Name>,
) -> Result<StatusCode, (StatusCode, String)> {
    require_admin(&app, auth).await?;
    let (category, removed) = engine::remove_category(app.database(), &name)
        .await
        .map_err(contest_error)?;
    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else if category.is_base() {
        Err((
            StatusCode::CONFLICT,
            format!("{category} is a base category"),
        ))
    } else {
        Err((StatusCode::NOT_FOUND, format!("unknown category {category}")))
    }
}
