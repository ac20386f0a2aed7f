//! User service — sidebar listing, public profiles, last-seen tracking.
//!
//! DESIGN
//! ======
//! The sidebar query enriches every other user with their latest message in
//! the shared conversation and the viewer's unread count, sorted so the most
//! recently active conversation comes first. Users with no conversation sort
//! after all users with one, in stable account-creation order, so the list
//! never reshuffles arbitrarily between fetches.

use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::events::Message;

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("user not found")]
    NotFound,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Public view of a user. Never carries the password hash.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub profile_pic: String,
    /// Milliseconds since Unix epoch; `None` while never disconnected.
    pub last_seen: Option<i64>,
}

/// One sidebar entry: a peer plus conversation-derived metadata.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SidebarUser {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub last_message: Option<Message>,
    pub unread_messages_count: i64,
}

fn row_to_profile(row: &sqlx::postgres::PgRow) -> UserProfile {
    UserProfile {
        id: row.get("id"),
        username: row.get("username"),
        full_name: row.get("full_name"),
        profile_pic: row.get("profile_pic"),
        last_seen: row.get("last_seen_ms"),
    }
}

const PROFILE_COLUMNS: &str = r"id, username, full_name, profile_pic,
    (EXTRACT(EPOCH FROM last_seen) * 1000)::BIGINT AS last_seen_ms";

// =============================================================================
// SIDEBAR
// =============================================================================

/// List every user except the viewer, enriched with the last message of the
/// shared conversation and the viewer's unread count, most recent
/// conversation first.
pub async fn sidebar(pool: &PgPool, viewer_id: Uuid) -> Result<Vec<SidebarUser>, UserError> {
    let rows = sqlx::query(&format!(
        "SELECT {PROFILE_COLUMNS},
                m.id AS m_id, m.sender_id AS m_sender_id, m.receiver_id AS m_receiver_id,
                m.text AS m_text, m.image AS m_image, m.is_read AS m_is_read,
                (EXTRACT(EPOCH FROM m.read_at) * 1000)::BIGINT AS m_read_at_ms,
                (EXTRACT(EPOCH FROM m.created_at) * 1000)::BIGINT AS m_created_at_ms,
                (SELECT COUNT(*) FROM messages
                  WHERE sender_id = u.id AND receiver_id = $1 AND is_read = false
                ) AS unread_count
         FROM users u
         LEFT JOIN LATERAL (
             SELECT * FROM messages
             WHERE (sender_id = u.id AND receiver_id = $1)
                OR (sender_id = $1 AND receiver_id = u.id)
             ORDER BY created_at DESC
             LIMIT 1
         ) m ON true
         WHERE u.id <> $1
         ORDER BY m.created_at DESC NULLS LAST, u.created_at ASC"
    ))
    .bind(viewer_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| {
            let last_message = row.get::<Option<Uuid>, _>("m_id").map(|id| Message {
                id,
                sender_id: row.get("m_sender_id"),
                receiver_id: row.get("m_receiver_id"),
                text: row.get("m_text"),
                image: row.get("m_image"),
                is_read: row.get("m_is_read"),
                read_at: row.get("m_read_at_ms"),
                created_at: row.get("m_created_at_ms"),
            });
            SidebarUser {
                profile: row_to_profile(row),
                last_message,
                unread_messages_count: row.get("unread_count"),
            }
        })
        .collect())
}

// =============================================================================
// PROFILES
// =============================================================================

/// Public profile lookup by username.
pub async fn get_by_username(pool: &PgPool, username: &str) -> Result<UserProfile, UserError> {
    let row = sqlx::query(&format!("SELECT {PROFILE_COLUMNS} FROM users WHERE username = $1"))
        .bind(username)
        .fetch_optional(pool)
        .await?
        .ok_or(UserError::NotFound)?;
    Ok(row_to_profile(&row))
}

/// Public profile lookup by ID.
pub async fn get_by_id(pool: &PgPool, user_id: Uuid) -> Result<UserProfile, UserError> {
    let row = sqlx::query(&format!("SELECT {PROFILE_COLUMNS} FROM users WHERE id = $1"))
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or(UserError::NotFound)?;
    Ok(row_to_profile(&row))
}

/// Record the disconnect time. Best-effort: a failure is logged by the
/// caller and never interrupts connection teardown.
pub async fn touch_last_seen(pool: &PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET last_seen = now() WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}
