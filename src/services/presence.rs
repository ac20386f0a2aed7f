//! Presence publisher — online-set broadcasts and targeted pushes.
//!
//! DESIGN
//! ======
//! Every registry mutation is followed by a full-set `getOnlineUsers`
//! broadcast to all live connections. The client presence UI wants the
//! complete set, not a delta; the online population is small enough that a
//! full-set broadcast is cheaper than delta tracking.
//!
//! All pushes are fire-and-forget: no acknowledgement, no retry. A
//! connection that is mid-disconnect simply does not receive the event, and
//! a full channel drops the frame with a warning.

use tracing::warn;
use uuid::Uuid;

use crate::events::ServerEvent;
use crate::state::AppState;

/// Broadcast the full current online-user set to every live connection.
/// Call after every register/unregister.
pub async fn broadcast_online_users(state: &AppState) {
    let registry = state.registry.read().await;
    let event = ServerEvent::GetOnlineUsers(registry.online_users());
    for conn in registry.connections() {
        if conn.tx.try_send(event.clone()).is_err() {
            warn!(conn_id = %conn.conn_id, "presence: dropped online-users broadcast");
        }
    }
}

/// Broadcast an event to every live connection.
pub async fn broadcast(state: &AppState, event: &ServerEvent) {
    let registry = state.registry.read().await;
    for conn in registry.connections() {
        // Best-effort: if a client's channel is full, skip it.
        let _ = conn.tx.try_send(event.clone());
    }
}

/// Push an event to a single user's live connection, if present.
/// Returns whether a connection was found. Absence is normal, not an error.
pub async fn push_to_user(state: &AppState, user_id: Uuid, event: &ServerEvent) -> bool {
    let registry = state.registry.read().await;
    let Some(conn) = registry.lookup(user_id) else {
        return false;
    };
    if conn.tx.try_send(event.clone()).is_err() {
        warn!(%user_id, "presence: push dropped, channel full");
    }
    true
}

/// Relay an ephemeral typing signal to the receiver's connection only.
/// Never persisted; silently dropped if the receiver is offline.
pub async fn notify_typing(state: &AppState, sender_id: Uuid, receiver_id: Uuid, is_typing: bool) {
    let event = if is_typing {
        ServerEvent::UserTyping { sender_id }
    } else {
        ServerEvent::UserStopTyping { sender_id }
    };
    push_to_user(state, receiver_id, &event).await;
}

#[cfg(test)]
#[path = "presence_test.rs"]
mod tests;
