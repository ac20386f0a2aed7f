//! Wire events — the realtime message types for Gigboard.
//!
//! ARCHITECTURE
//! ============
//! Every realtime communication is a tagged JSON event: `{"event": "...",
//! "data": {...}}`. Clients send a small fixed set of signals (typing), the
//! server pushes presence, delivery, and read-receipt events. The WS handler
//! routes on the `event` tag and never inspects payloads it does not own.
//!
//! DESIGN
//! ======
//! - The event vocabulary is closed: this is not a general pub/sub broker.
//! - Timestamps are milliseconds since Unix epoch (`i64`), assigned by the
//!   database at persistence time.
//! - `Message` is the full persisted record and is pushed verbatim as the
//!   `newMessage` payload, so a pushed message and a fetched message are
//!   identical JSON.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// MESSAGE RECORD
// =============================================================================

/// A persisted chat message. Mirrors the `messages` table.
///
/// Invariant: `read_at` is `Some` if and only if `is_read` is true. Both
/// fields are only ever written together in a single update.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub text: Option<String>,
    /// Durable media URL returned by the media store. Never a raw payload.
    pub image: Option<String>,
    pub is_read: bool,
    /// Milliseconds since Unix epoch. `None` until the read transition.
    pub read_at: Option<i64>,
    /// Milliseconds since Unix epoch, assigned by storage.
    pub created_at: i64,
}

// =============================================================================
// SERVER → CLIENT
// =============================================================================

/// Events pushed by the server over a live connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    /// Full online set, sent to everyone on every connect/disconnect.
    GetOnlineUsers(Vec<Uuid>),
    /// Full persisted message, pushed to the receiver only.
    NewMessage(Message),
    /// "Reorder your sidebar: this sender is now most-recent." Sent to all.
    #[serde(rename_all = "camelCase")]
    UpdateUserList { user_id: Uuid },
    /// Relayed typing signal, receiver only.
    #[serde(rename_all = "camelCase")]
    UserTyping { sender_id: Uuid },
    #[serde(rename_all = "camelCase")]
    UserStopTyping { sender_id: Uuid },
    /// Read transition, pushed to both participants.
    #[serde(rename_all = "camelCase")]
    MessageRead { message_id: Uuid, read_at: i64 },
}

// =============================================================================
// CLIENT → SERVER
// =============================================================================

/// Events a client may send over the connection. Everything else the client
/// does goes through the HTTP surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    #[serde(rename_all = "camelCase")]
    Typing { receiver_id: Uuid },
    #[serde(rename_all = "camelCase")]
    StopTyping { receiver_id: Uuid },
}

#[cfg(test)]
#[path = "events_test.rs"]
mod tests;
