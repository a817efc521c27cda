//! # Messaging Session
//!
//! Core orchestrator of the messaging subsystem. [`MessagingSession`] owns
//! the shared [`state::SessionState`], spawns async tasks for every network
//! operation, and applies their results (plus push events from the event
//! channel) through [`crate::events::AppEvent`] handling.
//!
//! ## Module Structure
//!
//! ```text
//! session/
//! ├── mod.rs           - MessagingSession struct and wiring
//! ├── state.rs         - SessionState and sub-states
//! ├── event_handler.rs - AppEvent dispatch
//! ├── directory.rs     - Conversation directory (peers, selection, search)
//! ├── history.rs       - Message history cache with stale-response guard
//! ├── typing.rs        - Typing indicators, inbound expiry + outbound idle
//! ├── unread.rs        - Unread count aggregation
//! ├── composer.rs      - Outbound sends with retry slot
//! └── read_sync.rs     - Read-receipt synchronization
//! ```
//!
//! ## Concurrency model
//!
//! All network operations and channel deliveries are asynchronous and may
//! interleave arbitrarily with user actions. The session guarantees that the
//! displayed history always corresponds to the current selection by tagging
//! history requests with a selection sequence number and discarding stale
//! responses at resolution time. Write locks are held for minimal duration
//! and never across an await point.

pub mod composer;
pub mod directory;
pub mod event_handler;
pub mod history;
pub mod read_sync;
pub mod state;
pub mod typing;
pub mod unread;

#[cfg(test)]
pub(crate) mod testutil;

use crate::core::service::MessagingApi;
use crate::events::AppEvent;
use async_channel::{Receiver, Sender};
use parking_lot::RwLock;
use state::SessionState;
use std::sync::Arc;

/// The messaging subsystem for one authenticated user.
///
/// Cheap to clone conceptually through its shared handles; operations take
/// `&self` and spawn tokio tasks that report back on the event bus. A host
/// drives the session by draining [`MessagingSession::events`] and feeding
/// each event to [`MessagingSession::handle_event`].
pub struct MessagingSession {
    pub(crate) state: Arc<RwLock<SessionState>>,
    pub(crate) api: Arc<dyn MessagingApi>,
    pub(crate) event_tx: Sender<AppEvent>,
    event_rx: Receiver<AppEvent>,
    pub(crate) user_id: i64,
    pub(crate) token: String,
}

impl MessagingSession {
    /// Create a session for an authenticated user.
    pub fn new(api: Arc<dyn MessagingApi>, user_id: i64, token: impl Into<String>) -> Self {
        let (event_tx, event_rx) = async_channel::unbounded();
        Self {
            state: Arc::new(RwLock::new(SessionState::default())),
            api,
            event_tx,
            event_rx,
            user_id,
            token: token.into(),
        }
    }

    /// Shared handle to the session state, for rendering.
    pub fn state(&self) -> Arc<RwLock<SessionState>> {
        Arc::clone(&self.state)
    }

    /// Receiver end of the event bus. The host drains this and calls
    /// [`MessagingSession::handle_event`] for each event.
    pub fn events(&self) -> Receiver<AppEvent> {
        self.event_rx.clone()
    }

    /// Sender end of the event bus, for wiring the event-channel subscriber.
    pub fn event_sender(&self) -> Sender<AppEvent> {
        self.event_tx.clone()
    }

    /// Initial load on subsystem start: peer directory and unread counts.
    pub fn start(&self) {
        self.load_peers();
        self.refresh_unread();
    }
}
