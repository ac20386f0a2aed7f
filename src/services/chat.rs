//! Chat service — message delivery and read receipts.
//!
//! DESIGN
//! ======
//! `send_message` persists strictly before any push: the receiver push and
//! the sidebar-reorder broadcast both happen after the insert has returned,
//! so a pushed message can always be found by a subsequent fetch. Push
//! failures (receiver offline, channel full) never block or roll back
//! persistence.
//!
//! Read transitions are single conditional updates (`... WHERE is_read =
//! false`), never read-then-write, so two near-simultaneous mark-read calls
//! cannot both pass the unread check: exactly one caller wins and notifies.

use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::events::{Message, ServerEvent};
use crate::services::media::MediaError;
use crate::services::presence;
use crate::state::AppState;

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message not found: {0}")]
    NotFound(Uuid),
    /// The requester is not the message's receiver.
    #[error("not your message to mark")]
    Forbidden,
    /// The message is already read. Benign: callers treat this as a no-op.
    #[error("message already read")]
    AlreadyRead,
    #[error("message must contain text or an image")]
    EmptyMessage,
    #[error(transparent)]
    Media(#[from] MediaError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

const MESSAGE_COLUMNS: &str = r"id, sender_id, receiver_id, text, image, is_read,
    (EXTRACT(EPOCH FROM read_at)  * 1000)::BIGINT AS read_at_ms,
    (EXTRACT(EPOCH FROM created_at) * 1000)::BIGINT AS created_at_ms";

fn row_to_message(row: &sqlx::postgres::PgRow) -> Message {
    Message {
        id: row.get("id"),
        sender_id: row.get("sender_id"),
        receiver_id: row.get("receiver_id"),
        text: row.get("text"),
        image: row.get("image"),
        is_read: row.get("is_read"),
        read_at: row.get("read_at_ms"),
        created_at: row.get("created_at_ms"),
    }
}

// =============================================================================
// SEND
// =============================================================================

/// Persist a message, push it to the receiver's live connection if present,
/// and broadcast a sidebar-reorder signal to all connections.
///
/// # Errors
///
/// Rejects messages with neither text nor image. An image payload that
/// cannot be uploaded fails the whole send — there is no text-only fallback.
pub async fn send_message(
    state: &AppState,
    sender_id: Uuid,
    receiver_id: Uuid,
    text: Option<String>,
    image: Option<String>,
) -> Result<Message, ChatError> {
    let text = text.filter(|t| !t.trim().is_empty());
    if text.is_none() && image.is_none() {
        return Err(ChatError::EmptyMessage);
    }

    // Exchange the raw payload for a durable URL before persistence.
    let image_url = match image {
        Some(payload) => {
            let media = state.media.as_ref().ok_or(MediaError::NotConfigured)?;
            Some(media.upload(&payload).await?)
        }
        None => None,
    };

    let row = sqlx::query(&format!(
        "INSERT INTO messages (sender_id, receiver_id, text, image)
         VALUES ($1, $2, $3, $4)
         RETURNING {MESSAGE_COLUMNS}"
    ))
    .bind(sender_id)
    .bind(receiver_id)
    .bind(&text)
    .bind(&image_url)
    .fetch_one(&state.pool)
    .await?;
    let message = row_to_message(&row);

    info!(message_id = %message.id, %sender_id, %receiver_id, "chat: message persisted");

    // Push after persistence only. Receiver offline is a no-op — they will
    // see the message on their next fetch.
    let delivered = presence::push_to_user(state, receiver_id, &ServerEvent::NewMessage(message.clone())).await;
    if !delivered {
        info!(message_id = %message.id, %receiver_id, "chat: receiver offline, push skipped");
    }

    // Every connected client reorders its sidebar without refetching.
    presence::broadcast(state, &ServerEvent::UpdateUserList { user_id: sender_id }).await;

    Ok(message)
}

// =============================================================================
// FETCH
// =============================================================================

/// Return the full conversation between `viewer_id` and `peer_id`, oldest
/// first. Opening a conversation is reading it: every unread message from
/// the peer is transitioned to read in one batch before the select, so the
/// returned records already reflect the transition.
pub async fn fetch_conversation(
    pool: &PgPool,
    viewer_id: Uuid,
    peer_id: Uuid,
) -> Result<Vec<Message>, ChatError> {
    let transitioned = sqlx::query(
        "UPDATE messages SET is_read = true, read_at = now()
         WHERE sender_id = $1 AND receiver_id = $2 AND is_read = false",
    )
    .bind(peer_id)
    .bind(viewer_id)
    .execute(pool)
    .await?
    .rows_affected();

    if transitioned > 0 {
        info!(%viewer_id, %peer_id, transitioned, "chat: bulk read transition on fetch");
    }

    let rows = sqlx::query(&format!(
        "SELECT {MESSAGE_COLUMNS} FROM messages
         WHERE (sender_id = $1 AND receiver_id = $2)
            OR (sender_id = $2 AND receiver_id = $1)
         ORDER BY created_at ASC"
    ))
    .bind(viewer_id)
    .bind(peer_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(row_to_message).collect())
}

// =============================================================================
// READ RECEIPT
// =============================================================================

/// Transition one message from unread to read, exactly once, and notify both
/// participants' live connections.
///
/// # Errors
///
/// - `NotFound` if the message does not exist.
/// - `Forbidden` if the requester is not the receiver.
/// - `AlreadyRead` if the transition already happened — the caller must
///   treat this as a benign no-op, not a fatal error.
pub async fn mark_read(state: &AppState, message_id: Uuid, requester_id: Uuid) -> Result<i64, ChatError> {
    let row = sqlx::query("SELECT sender_id, receiver_id FROM messages WHERE id = $1")
        .bind(message_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(ChatError::NotFound(message_id))?;

    let sender_id: Uuid = row.get("sender_id");
    let receiver_id: Uuid = row.get("receiver_id");
    if requester_id != receiver_id {
        return Err(ChatError::Forbidden);
    }

    // Conditional update: of two racing calls, exactly one sees a row here.
    let updated = sqlx::query(
        "UPDATE messages SET is_read = true, read_at = now()
         WHERE id = $1 AND is_read = false
         RETURNING (EXTRACT(EPOCH FROM read_at) * 1000)::BIGINT AS read_at_ms",
    )
    .bind(message_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(ChatError::AlreadyRead)?;

    let read_at: i64 = updated.get("read_at_ms");
    info!(%message_id, %requester_id, "chat: read transition");

    // Best-effort notify; absence of either connection is not an error.
    let event = ServerEvent::MessageRead { message_id, read_at };
    presence::push_to_user(state, sender_id, &event).await;
    presence::push_to_user(state, receiver_id, &event).await;

    Ok(read_at)
}

#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;
