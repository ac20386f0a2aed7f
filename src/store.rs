//! Client-side conversation store — the in-memory view a connected client
//! keeps consistent with server pushes.
//!
//! DESIGN
//! ======
//! Pure state machine, no I/O: the surrounding client owns the socket and
//! feeds every inbound `ServerEvent` through [`ChatStore::apply`]. Fetch
//! results enter through `conversation_loaded`. One conversation is open at
//! a time; `close_conversation` is the single teardown path, so repeated
//! open/close cycles can never accumulate duplicate handler state.
//!
//! ORDERING
//! ========
//! The sidebar is ordered "most recent conversation activity first"; peers
//! with no messages sort after all peers with at least one, keeping their
//! relative order. Inbound events move the affected peer to the front
//! instead of re-sorting, so the list never reshuffles arbitrarily.

use std::collections::HashSet;

use uuid::Uuid;

use crate::events::{Message, ServerEvent};

/// Load state of the open conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    NotLoaded,
    Loading,
    Loaded,
}

/// One sidebar entry.
#[derive(Debug, Clone)]
pub struct PeerEntry {
    pub user_id: Uuid,
    pub last_message: Option<Message>,
    pub unread_count: u32,
}

impl PeerEntry {
    #[must_use]
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id, last_message: None, unread_count: 0 }
    }
}

/// The authoritative client-side view: open conversation, sidebar, presence.
#[derive(Debug)]
pub struct ChatStore {
    me: Uuid,
    peers: Vec<PeerEntry>,
    online: HashSet<Uuid>,
    typing: HashSet<Uuid>,
    selected: Option<Uuid>,
    load_state: LoadState,
    messages: Vec<Message>,
    /// Messages already submitted for a visibility-triggered read mark, so
    /// scrolling cannot fire duplicate requests.
    pending_read_marks: HashSet<Uuid>,
}

impl ChatStore {
    #[must_use]
    pub fn new(me: Uuid) -> Self {
        Self {
            me,
            peers: Vec::new(),
            online: HashSet::new(),
            typing: HashSet::new(),
            selected: None,
            load_state: LoadState::NotLoaded,
            messages: Vec::new(),
            pending_read_marks: HashSet::new(),
        }
    }

    // =========================================================================
    // SIDEBAR
    // =========================================================================

    /// Replace the sidebar with a fresh fetch, enforcing the canonical order:
    /// most recent activity first, message-less peers last in stable order.
    pub fn set_peers(&mut self, mut peers: Vec<PeerEntry>) {
        peers.sort_by(|a, b| {
            match (&a.last_message, &b.last_message) {
                (Some(ma), Some(mb)) => mb.created_at.cmp(&ma.created_at),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            }
        });
        self.peers = peers;
    }

    fn move_peer_front(&mut self, user_id: Uuid) {
        if let Some(pos) = self.peers.iter().position(|p| p.user_id == user_id) {
            let entry = self.peers.remove(pos);
            self.peers.insert(0, entry);
        }
    }

    fn peer_entry_mut(&mut self, user_id: Uuid) -> &mut PeerEntry {
        let pos = match self.peers.iter().position(|p| p.user_id == user_id) {
            Some(pos) => pos,
            None => {
                self.peers.push(PeerEntry::new(user_id));
                self.peers.len() - 1
            }
        };
        &mut self.peers[pos]
    }

    // =========================================================================
    // CONVERSATION LIFECYCLE
    // =========================================================================

    /// Open a conversation: NotLoaded/Loaded → Loading.
    pub fn select_peer(&mut self, peer_id: Uuid) {
        self.close_conversation();
        self.selected = Some(peer_id);
        self.load_state = LoadState::Loading;
    }

    /// Apply a resolved conversation fetch. Clears the peer's unread counter
    /// locally the moment the fetch lands, independent of server
    /// confirmation. A fetch for a peer that is no longer selected is stale
    /// and dropped.
    pub fn conversation_loaded(&mut self, peer_id: Uuid, messages: Vec<Message>) {
        if self.selected != Some(peer_id) {
            return;
        }
        self.messages = messages;
        self.load_state = LoadState::Loaded;
        self.peer_entry_mut(peer_id).unread_count = 0;
    }

    /// Single teardown path for the open conversation. Clears the message
    /// sequence and the pending read-mark set so a reopened conversation
    /// starts from a clean slate.
    pub fn close_conversation(&mut self) {
        self.selected = None;
        self.load_state = LoadState::NotLoaded;
        self.messages.clear();
        self.pending_read_marks.clear();
    }

    // =========================================================================
    // EVENT MERGE
    // =========================================================================

    /// Merge one server push into the view.
    pub fn apply(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::GetOnlineUsers(users) => {
                self.online = users.into_iter().collect();
            }
            ServerEvent::NewMessage(message) => self.apply_new_message(message),
            ServerEvent::MessageRead { message_id, read_at } => {
                // In-place update by identifier; silent no-op when absent.
                if let Some(m) = self.messages.iter_mut().find(|m| m.id == message_id) {
                    m.is_read = true;
                    m.read_at = Some(read_at);
                }
                for peer in &mut self.peers {
                    if let Some(last) = &mut peer.last_message {
                        if last.id == message_id {
                            last.is_read = true;
                            last.read_at = Some(read_at);
                        }
                    }
                }
            }
            ServerEvent::UpdateUserList { user_id } => {
                self.move_peer_front(user_id);
            }
            ServerEvent::UserTyping { sender_id } => {
                self.typing.insert(sender_id);
            }
            ServerEvent::UserStopTyping { sender_id } => {
                self.typing.remove(&sender_id);
            }
        }
    }

    fn apply_new_message(&mut self, message: Message) {
        let peer_id = if message.sender_id == self.me {
            message.receiver_id
        } else {
            message.sender_id
        };
        let matches_open = self.load_state == LoadState::Loaded
            && (self.selected == Some(message.sender_id) || self.selected == Some(message.receiver_id));

        let from_peer = message.sender_id != self.me;
        let entry = self.peer_entry_mut(peer_id);
        entry.last_message = Some(message.clone());
        if !matches_open && from_peer {
            entry.unread_count += 1;
        }
        self.move_peer_front(peer_id);

        if matches_open {
            self.messages.push(message);
        }
    }

    /// Record a message sent by this client (the HTTP response), appending it
    /// to the open sequence and refreshing the peer's last message.
    pub fn message_sent(&mut self, message: Message) {
        self.apply_new_message(message);
    }

    // =========================================================================
    // READ MARKS
    // =========================================================================

    /// Claim a message for a visibility-triggered read mark. Returns true if
    /// the caller should issue the request; false if the message is already
    /// read, already claimed, or not the viewer's to mark.
    pub fn begin_read_mark(&mut self, message_id: Uuid) -> bool {
        let Some(message) = self.messages.iter().find(|m| m.id == message_id) else {
            return false;
        };
        if message.is_read || message.sender_id == self.me {
            return false;
        }
        self.pending_read_marks.insert(message_id)
    }

    /// A read-mark request failed: release the claim so a later retry can
    /// resubmit it.
    pub fn read_mark_failed(&mut self, message_id: Uuid) {
        self.pending_read_marks.remove(&message_id);
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[must_use]
    pub fn peers(&self) -> &[PeerEntry] {
        &self.peers
    }

    #[must_use]
    pub fn selected_peer(&self) -> Option<Uuid> {
        self.selected
    }

    #[must_use]
    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    #[must_use]
    pub fn is_online(&self, user_id: Uuid) -> bool {
        self.online.contains(&user_id)
    }

    #[must_use]
    pub fn is_typing(&self, user_id: Uuid) -> bool {
        self.typing.contains(&user_id)
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
