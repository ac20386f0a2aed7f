//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Binds the HTTP API and the websocket endpoint under a single Axum router.
//! Post listing/detail and public profile lookups are open; everything else
//! requires a session cookie via the `AuthUser` extractor.

pub mod auth;
pub mod balance;
pub mod messages;
pub mod posts;
pub mod ws;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/check", get(auth::check))
        .route("/api/auth/user/{username}", get(auth::profile_by_username))
        .route("/api/auth/user/id/{id}", get(auth::profile_by_id))
        .route("/api/posts", get(posts::list).post(posts::create))
        .route("/api/posts/{id}", get(posts::get_one))
        .route("/api/balance", get(balance::get_balance))
        .route("/api/balance/update", post(balance::update_balance))
        .route("/api/messages/users", get(messages::sidebar))
        .route("/api/messages/send/{peer_id}", post(messages::send))
        .route("/api/messages/mark-read/{message_id}", post(messages::mark_read))
        .route("/api/messages/{peer_id}", get(messages::conversation))
        .route("/api/ws", get(ws::handle_ws))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
