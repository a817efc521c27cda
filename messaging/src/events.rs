//! # Application Events
//!
//! Event types carried on the bus between background tasks (network
//! requests, channel subscriber, timers) and the session event handler.

use crate::session::state::ChannelStatus;
use shared::dto::messaging::{Message, MessageSentEvent, Peer, SendMessageRequest, TypingSignalEvent};
use std::collections::HashMap;

/// Async task results and push events delivered to the session.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Peer directory fetch completed.
    PeersLoaded(Result<Vec<Peer>, String>),
    /// Message history fetch completed for `peer_id`.
    ///
    /// `seq` is the selection sequence number captured when the request was
    /// issued; the handler discards the result when it no longer matches.
    HistoryLoaded {
        peer_id: i64,
        seq: u64,
        result: Result<Vec<Message>, String>,
    },
    /// Unread-count map fetch completed.
    UnreadCountsLoaded(Result<HashMap<i64, u32>, String>),
    /// Outbound send completed. The original request is carried so failed
    /// content can be restored for retry.
    SendCompleted {
        request: SendMessageRequest,
        result: Result<Message, String>,
    },
    /// Read acknowledgment completed for `peer_id`.
    ReadAcknowledged {
        peer_id: i64,
        result: Result<(), String>,
    },
    /// `message.sent` push event from the private channel.
    MessageSent(MessageSentEvent),
    /// `is-typing` push event from the private channel.
    PeerTyping(TypingSignalEvent),
    /// Inbound typing indicator expiry timer fired.
    TypingExpired { peer_id: i64, epoch: u64 },
    /// Local outbound idle timer fired (no keystroke for the idle window).
    TypingIdle { epoch: u64 },
    /// Event-channel connection status changed.
    ChannelStatus(ChannelStatus),
}
