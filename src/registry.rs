//! Connection registry — who is online, and how to reach them.
//!
//! DESIGN
//! ======
//! Process-scoped mapping from user ID to the live connection that currently
//! represents them. At most one connection per user: opening a second
//! connection overwrites the first (last connection wins). The registry is
//! owned by `AppState` and injected into every handler that needs it, never
//! accessed as ambient global state, so it can be exercised in isolation.
//!
//! All operations are total functions over the mapping — there are no error
//! conditions. Presence broadcasts on mutation are the caller's concern.

use std::collections::HashMap;

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::events::ServerEvent;

/// One live connection: an opaque connection ID plus the sender half of the
/// outbound push channel for that socket.
#[derive(Debug, Clone)]
pub struct Connection {
    pub conn_id: Uuid,
    pub tx: mpsc::Sender<ServerEvent>,
}

/// In-memory user → connection mapping. Rebuilt from nothing on restart;
/// all presence state is intentionally lost across restarts.
#[derive(Debug, Default)]
pub struct Registry {
    entries: HashMap<Uuid, Connection>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self { entries: HashMap::new() }
    }

    /// Unconditional upsert. Overwrites any prior connection for this user.
    pub fn register(&mut self, user_id: Uuid, conn_id: Uuid, tx: mpsc::Sender<ServerEvent>) {
        self.entries.insert(user_id, Connection { conn_id, tx });
    }

    /// Pure read.
    #[must_use]
    pub fn lookup(&self, user_id: Uuid) -> Option<&Connection> {
        self.entries.get(&user_id)
    }

    /// Remove the entry for `user_id`, but only if it still belongs to
    /// `conn_id`. A disconnect from an overwritten connection must not evict
    /// the newer one that replaced it. Idempotent.
    pub fn unregister(&mut self, user_id: Uuid, conn_id: Uuid) {
        if self.entries.get(&user_id).is_some_and(|c| c.conn_id == conn_id) {
            self.entries.remove(&user_id);
        }
    }

    /// The full current online set.
    #[must_use]
    pub fn online_users(&self) -> Vec<Uuid> {
        self.entries.keys().copied().collect()
    }

    /// All live connections, for full broadcasts.
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.entries.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
