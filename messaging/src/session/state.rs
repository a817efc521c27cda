//! # Session State Types
//!
//! All mutable state owned by the messaging subsystem: the peer directory,
//! the current selection, the cached history for the open conversation, the
//! unread-count map, typing signals and composer state.
//!
//! State lives behind `Arc<parking_lot::RwLock<SessionState>>` and is
//! mutated only through [`crate::session::MessagingSession`] operations.
//! Consistency comes from re-deriving state from the server (wholesale
//! replacement) rather than merging concurrent local mutations.

use shared::dto::messaging::{Message, Peer, SendMessageRequest};
use std::collections::HashMap;

/// The currently open conversation.
///
/// `seq` is a monotonically increasing sequence number bumped on every
/// selection change. Responses to requests issued against an earlier
/// selection carry a stale `seq` and are discarded at resolution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub peer_id: i64,
    pub seq: u64,
}

/// Cached message history for the open conversation.
///
/// Replaced wholesale on every refetch; never patched incrementally.
#[derive(Debug, Clone, Default)]
pub struct HistoryState {
    /// Peer the cached messages belong to.
    pub peer_id: Option<i64>,
    /// Messages ascending by `(created_at, id)`.
    pub messages: Vec<Message>,
    /// A refetch is in flight.
    pub loading: bool,
}

/// Inbound and outbound typing-signal state.
#[derive(Debug, Clone, Default)]
pub struct TypingState {
    /// Peers with an active inbound typing signal, mapped to the epoch of
    /// their latest renewal. The expiry timer for an older epoch loses the
    /// compare and leaves the entry alone.
    pub inbound: HashMap<i64, u64>,
    /// Epoch counter shared by inbound expiry and outbound idle timers.
    pub next_epoch: u64,
    /// The local user currently counts as typing towards the selected peer.
    pub outbound_active: bool,
    /// Epoch of the most recently armed outbound idle timer.
    pub outbound_epoch: u64,
}

impl TypingState {
    /// Reserve the next timer epoch.
    pub fn bump_epoch(&mut self) -> u64 {
        self.next_epoch += 1;
        self.next_epoch
    }
}

/// Composer state for the message input surface.
///
/// Composed content is never lost on a failed send: it is held in
/// `in_flight` until the server acknowledges, and moved to `failed` (and
/// restored to `input`) when the send errors.
#[derive(Debug, Clone, Default)]
pub struct ComposerState {
    /// Current input text.
    pub input: String,
    /// A send is in flight; further sends are rejected until it completes.
    pub sending: bool,
    /// The request currently awaiting server acknowledgment.
    pub in_flight: Option<SendMessageRequest>,
    /// The last failed request, kept for retry.
    pub failed: Option<SendMessageRequest>,
    /// Error from the last failed send, surfaced to the user.
    pub last_error: Option<String>,
}

/// Event-channel connection state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ChannelState {
    /// Not connected, not attempting.
    #[default]
    Disconnected,
    /// Attempting the first connection.
    Connecting,
    /// Successfully connected and subscribed.
    Connected,
    /// Connection lost, retrying.
    Reconnecting,
    /// Permanently disabled (max consecutive failures reached).
    Disabled,
}

/// Event-channel connection status details.
#[derive(Debug, Clone, Default)]
pub struct ChannelStatus {
    pub state: ChannelState,
    /// Total connection attempts this session.
    pub connection_attempts: u64,
    /// Last transport error, if any.
    pub last_error: Option<String>,
    /// Total channel events received.
    pub events_received: u64,
}

/// Global session state for the messaging subsystem.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// Peer directory, in server order.
    pub peers: Vec<Peer>,
    /// Currently open conversation, at most one at a time.
    pub selection: Option<Selection>,
    /// Monotonic counter backing [`Selection::seq`].
    pub selection_seq: u64,
    /// History cache for the open conversation.
    pub history: HistoryState,
    /// Peer id → unread inbound count. Absent means zero.
    pub unread: HashMap<i64, u32>,
    /// Typing-signal state.
    pub typing: TypingState,
    /// Composer state.
    pub composer: ComposerState,
    /// Event-channel status.
    pub channel: ChannelStatus,
}

impl SessionState {
    /// Unread inbound count for a peer; absent from the map means zero.
    pub fn unread_count(&self, peer_id: i64) -> u32 {
        self.unread.get(&peer_id).copied().unwrap_or(0)
    }

    /// Peer id of the open conversation, if any.
    pub fn selected_peer_id(&self) -> Option<i64> {
        self.selection.map(|s| s.peer_id)
    }

    /// True while the peer has an unexpired inbound typing signal.
    pub fn is_peer_typing(&self, peer_id: i64) -> bool {
        self.typing.inbound.contains_key(&peer_id)
    }
}
