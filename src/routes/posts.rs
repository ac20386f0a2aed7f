//! Post routes — public task listings.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use uuid::Uuid;

use crate::routes::auth::AuthUser;
use crate::services::posts as posts_svc;
use crate::state::AppState;

/// `GET /api/posts` — list all posts, newest first. Public.
pub async fn list(State(state): State<AppState>) -> Response {
    match posts_svc::list_posts(&state.pool).await {
        Ok(posts) => Json(posts).into_response(),
        Err(e) => post_error_response(e),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostBody {
    pub title: String,
    pub description: String,
    pub budget: i64,
    /// Milliseconds since Unix epoch.
    pub deadline: i64,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default = "default_category")]
    pub category: String,
}

fn default_category() -> String {
    "other".to_owned()
}

/// `POST /api/posts` — create a task listing. Authenticated.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreatePostBody>,
) -> Response {
    match posts_svc::create_post(
        &state.pool,
        auth.user.id,
        &body.title,
        &body.description,
        body.budget,
        body.deadline,
        &body.skills,
        &body.category,
    )
    .await
    {
        Ok(post) => (StatusCode::CREATED, Json(post)).into_response(),
        Err(e) => post_error_response(e),
    }
}

/// `GET /api/posts/:id` — post detail. Public.
pub async fn get_one(State(state): State<AppState>, Path(post_id): Path<Uuid>) -> Response {
    match posts_svc::get_post(&state.pool, post_id).await {
        Ok(post) => Json(post).into_response(),
        Err(e) => post_error_response(e),
    }
}

fn post_error_response(err: posts_svc::PostError) -> Response {
    let status = match err {
        posts_svc::PostError::NotFound(_) => StatusCode::NOT_FOUND,
        posts_svc::PostError::InvalidFields => StatusCode::BAD_REQUEST,
        posts_svc::PostError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(serde_json::json!({ "message": err.to_string() }))).into_response()
}
