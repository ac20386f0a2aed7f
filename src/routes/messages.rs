//! Message routes — sidebar, conversation fetch, send, mark-read.
//!
//! The handlers translate between HTTP and the chat service; delivery and
//! read-receipt semantics live in `services::chat`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use uuid::Uuid;

use crate::events::Message;
use crate::routes::auth::{AuthUser, user_error_to_status};
use crate::services::chat::{self, ChatError};
use crate::services::users;
use crate::state::AppState;

/// `GET /api/messages/users` — sidebar listing with last message and unread
/// count per peer.
pub async fn sidebar(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<users::SidebarUser>>, StatusCode> {
    users::sidebar(&state.pool, auth.user.id)
        .await
        .map(Json)
        .map_err(user_error_to_status)
}

/// `GET /api/messages/:peer_id` — full conversation with a peer.
/// Side effect: every unread message from that peer is transitioned to read.
pub async fn conversation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(peer_id): Path<Uuid>,
) -> Result<Json<Vec<Message>>, Response> {
    chat::fetch_conversation(&state.pool, auth.user.id, peer_id)
        .await
        .map(Json)
        .map_err(chat_error_response)
}

#[derive(Deserialize)]
pub struct SendBody {
    pub text: Option<String>,
    /// Base64 data URL; exchanged for a durable URL before persistence.
    pub image: Option<String>,
}

/// `POST /api/messages/send/:peer_id` — persist and deliver a message.
pub async fn send(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(peer_id): Path<Uuid>,
    Json(body): Json<SendBody>,
) -> Result<(StatusCode, Json<Message>), Response> {
    chat::send_message(&state, auth.user.id, peer_id, body.text, body.image)
        .await
        .map(|m| (StatusCode::CREATED, Json(m)))
        .map_err(chat_error_response)
}

/// `POST /api/messages/mark-read/:message_id` — single-message read receipt.
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(message_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, Response> {
    let read_at = chat::mark_read(&state, message_id, auth.user.id)
        .await
        .map_err(chat_error_response)?;
    Ok(Json(serde_json::json!({ "messageId": message_id, "readAt": read_at })))
}

pub(crate) fn chat_error_status(err: &ChatError) -> StatusCode {
    match err {
        ChatError::NotFound(_) => StatusCode::NOT_FOUND,
        ChatError::Forbidden => StatusCode::FORBIDDEN,
        // Terminal-state rejection: benign, but explicit for the caller.
        ChatError::AlreadyRead => StatusCode::CONFLICT,
        ChatError::EmptyMessage => StatusCode::BAD_REQUEST,
        ChatError::Media(_) => StatusCode::BAD_GATEWAY,
        ChatError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn chat_error_response(err: ChatError) -> Response {
    let status = chat_error_status(&err);
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(error = %err, "message route failed");
    }
    (status, Json(serde_json::json!({ "message": err.to_string() }))).into_response()
}

#[cfg(test)]
#[path = "messages_test.rs"]
mod tests;
