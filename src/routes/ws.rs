//! WebSocket handler — realtime presence, delivery, and typing relay.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade with `?user_id=...` → register in the connection registry
//!    (last connection wins) → broadcast the full online set to everyone.
//! 2. `select!` loop: inbound client events (typing signals) are relayed;
//!    push events queued by HTTP handlers are forwarded down the socket.
//! 3. Close → conditional unregister (a stale socket must not evict a newer
//!    one) → broadcast the online set again → record `last_seen`.
//!
//! Pushes flow through a bounded per-connection channel; HTTP handlers never
//! write to the socket directly.

use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::events::{ClientEvent, ServerEvent};
use crate::services::{presence, users};
use crate::state::AppState;

/// Outbound channel depth per connection. A slow client that falls more
/// than this far behind starts losing pushes (fire-and-forget semantics).
const PUSH_CHANNEL_CAPACITY: usize = 256;

#[derive(Deserialize)]
pub struct ConnectParams {
    user_id: Uuid,
}

pub async fn handle_ws(
    State(state): State<AppState>,
    Query(params): Query<ConnectParams>,
    ws: WebSocketUpgrade,
) -> Response {
    if params.user_id.is_nil() {
        return (StatusCode::BAD_REQUEST, "user_id required").into_response();
    }
    ws.on_upgrade(move |socket| run_ws(socket, state, params.user_id))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState, user_id: Uuid) {
    let conn_id = Uuid::new_v4();
    let (tx, mut rx) = mpsc::channel::<ServerEvent>(PUSH_CHANNEL_CAPACITY);

    state.registry.write().await.register(user_id, conn_id, tx);
    info!(%user_id, %conn_id, "ws: client connected");
    presence::broadcast_online_users(&state).await;

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(Ok(msg)) = msg else { break };
                match msg {
                    WsMessage::Text(text) => {
                        handle_client_text(&state, user_id, &text).await;
                    }
                    WsMessage::Close(_) => break,
                    _ => {}
                }
            }
            Some(event) = rx.recv() => {
                if send_event(&mut socket, &event).await.is_err() {
                    break;
                }
            }
        }
    }

    // Conditional: if a newer connection already overwrote this entry, the
    // registry keeps it.
    state.registry.write().await.unregister(user_id, conn_id);
    presence::broadcast_online_users(&state).await;

    if let Err(e) = users::touch_last_seen(&state.pool, user_id).await {
        warn!(%user_id, error = %e, "ws: last_seen update failed");
    }
    info!(%user_id, %conn_id, "ws: client disconnected");
}

// =============================================================================
// INBOUND EVENTS
// =============================================================================

/// Parse and apply one inbound client event. Unknown or malformed events are
/// logged and dropped; the connection stays up.
pub(crate) async fn handle_client_text(state: &AppState, user_id: Uuid, text: &str) {
    let event: ClientEvent = match serde_json::from_str(text) {
        Ok(e) => e,
        Err(e) => {
            warn!(%user_id, error = %e, "ws: invalid inbound event");
            return;
        }
    };

    match event {
        ClientEvent::Typing { receiver_id } => {
            presence::notify_typing(state, user_id, receiver_id, true).await;
        }
        ClientEvent::StopTyping { receiver_id } => {
            presence::notify_typing(state, user_id, receiver_id, false).await;
        }
    }
}

async fn send_event(socket: &mut WebSocket, event: &ServerEvent) -> Result<(), ()> {
    let json = match serde_json::to_string(event) {
        Ok(j) => j,
        Err(e) => {
            warn!(error = %e, "ws: failed to serialize event");
            return Err(());
        }
    };
    socket.send(WsMessage::Text(json.into())).await.map_err(|_| ())
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;
