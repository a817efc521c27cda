//! In-memory mock server and event-pump helpers for session tests.
//!
//! Tests run on a paused current-thread runtime; [`pump`] drains the event
//! bus through the session until it goes quiet, so a test reads like a
//! scripted exchange with the server.

use crate::core::service::MessagingApi;
use crate::session::MessagingSession;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use shared::dto::messaging::{Message, MessageSentEvent, MessageType, Peer, SendMessageRequest};
use std::collections::HashMap;
use std::time::Duration;

/// Server-side state behind the mock. Tests mutate it directly through
/// `api.state.lock()` to script failures and latency.
#[derive(Default)]
pub struct ServerState {
    pub peers: Vec<Peer>,
    /// Conversation histories keyed by peer id, in arrival order.
    pub histories: HashMap<i64, Vec<Message>>,
    pub unread: HashMap<i64, u32>,
    pub next_message_id: i64,
    /// When set, read operations fail with a canned error.
    pub fail_reads: bool,
    /// When set, sends fail with a canned error.
    pub fail_sends: bool,
    /// Latency applied to sends.
    pub send_delay: Duration,
    /// Per-peer latency applied to history fetches.
    pub history_delays: HashMap<i64, Duration>,
    /// Every `(peer_id, is_typing)` signal received, in order.
    pub typing_log: Vec<(i64, bool)>,
    /// Every read acknowledgment received, in order.
    pub read_log: Vec<i64>,
}

/// In-memory [`MessagingApi`] standing in for the marketplace backend.
pub struct MockApi {
    pub state: Mutex<ServerState>,
    user_id: i64,
}

impl MockApi {
    pub fn new(user_id: i64, peers: Vec<Peer>) -> Self {
        Self {
            state: Mutex::new(ServerState {
                peers,
                next_message_id: 1,
                ..ServerState::default()
            }),
            user_id,
        }
    }

    pub fn peer(id: i64, name: &str) -> Peer {
        Peer {
            id,
            name: name.to_string(),
            is_active: true,
        }
    }

    /// Record an inbound message from `peer_id` server-side and return the
    /// push event a live channel would deliver for it.
    pub fn peer_sends(&self, peer_id: i64, body: &str) -> MessageSentEvent {
        let mut server = self.state.lock();
        let message = Message {
            id: server.next_message_id,
            sender_id: peer_id,
            receiver_id: self.user_id,
            message_type: MessageType::Text,
            message: body.to_string(),
            attachment: None,
            property_ref: None,
            created_at: Utc::now(),
            read_at: None,
        };
        server.next_message_id += 1;
        server.histories.entry(peer_id).or_default().push(message.clone());
        *server.unread.entry(peer_id).or_insert(0) += 1;
        MessageSentEvent {
            sender_user_id: peer_id,
            message: Some(message),
        }
    }
}

#[async_trait]
impl MessagingApi for MockApi {
    async fn list_peers(&self, _token: &str) -> Result<Vec<Peer>, String> {
        let (fail, peers) = {
            let server = self.state.lock();
            (server.fail_reads, server.peers.clone())
        };
        if fail {
            return Err("peers unavailable".to_string());
        }
        Ok(peers)
    }

    async fn fetch_history(&self, _token: &str, peer_id: i64) -> Result<Vec<Message>, String> {
        let (delay, fail, messages) = {
            let server = self.state.lock();
            (
                server.history_delays.get(&peer_id).copied().unwrap_or_default(),
                server.fail_reads,
                server.histories.get(&peer_id).cloned().unwrap_or_default(),
            )
        };
        tokio::time::sleep(delay).await;
        if fail {
            return Err("history unavailable".to_string());
        }
        Ok(messages)
    }

    async fn send_message(
        &self,
        _token: &str,
        request: SendMessageRequest,
    ) -> Result<Message, String> {
        let delay = self.state.lock().send_delay;
        tokio::time::sleep(delay).await;

        let mut server = self.state.lock();
        if server.fail_sends {
            return Err("send failed".to_string());
        }
        let message = Message {
            id: server.next_message_id,
            sender_id: self.user_id,
            receiver_id: request.receiver_id,
            message_type: request.message_type,
            message: request.message,
            attachment: request.attachment,
            property_ref: request.property_ref,
            created_at: Utc::now(),
            read_at: None,
        };
        server.next_message_id += 1;
        server
            .histories
            .entry(request.receiver_id)
            .or_default()
            .push(message.clone());
        Ok(message)
    }

    async fn mark_read(&self, _token: &str, peer_id: i64) -> Result<(), String> {
        let mut server = self.state.lock();
        server.read_log.push(peer_id);
        server.unread.remove(&peer_id);
        Ok(())
    }

    async fn signal_typing(
        &self,
        _token: &str,
        peer_id: i64,
        is_typing: bool,
    ) -> Result<(), String> {
        self.state.lock().typing_log.push((peer_id, is_typing));
        Ok(())
    }

    async fn unread_counts(&self, _token: &str) -> Result<HashMap<i64, u32>, String> {
        let (fail, counts) = {
            let server = self.state.lock();
            (server.fail_reads, server.unread.clone())
        };
        if fail {
            return Err("counts unavailable".to_string());
        }
        Ok(counts)
    }
}

/// Drain the event bus through the session until it stays quiet for one
/// virtual millisecond. Paused-clock timeouts auto-advance only to their own
/// deadline, so long-armed timers (typing expiry, idle) do not fire here.
pub async fn pump(session: &MessagingSession) {
    pump_within(session, Duration::from_millis(1)).await;
}

/// Like [`pump`], but tolerates `patience` of simulated server latency
/// between events. Used when a test scripts `send_delay`/`history_delays`.
pub async fn pump_within(session: &MessagingSession, patience: Duration) {
    let events = session.events();
    loop {
        match tokio::time::timeout(patience, events.recv()).await {
            Ok(Ok(event)) => session.handle_event(event),
            _ => break,
        }
    }
}
