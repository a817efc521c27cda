//! # Service Traits
//!
//! Traits for dependency injection, enabling better testability and modularity.

use async_trait::async_trait;
use shared::dto::messaging::{Message, Peer, SendMessageRequest};
use std::collections::HashMap;

/// Trait over the REST operations the messaging core consumes.
///
/// Implemented by [`crate::services::api::ApiClient`] for production and by
/// an in-memory mock server in tests. Methods return `Result<_, String>`
/// like the API layer itself; the session converts to
/// [`crate::core::error::AppError`] where an error is surfaced.
#[async_trait]
pub trait MessagingApi: Send + Sync {
    /// List conversation counterparts for the current user, in server order.
    async fn list_peers(&self, token: &str) -> Result<Vec<Peer>, String>;

    /// Full message history with `peer_id`.
    async fn fetch_history(&self, token: &str, peer_id: i64) -> Result<Vec<Message>, String>;

    /// Send a message; returns the canonical server copy.
    async fn send_message(&self, token: &str, request: SendMessageRequest)
        -> Result<Message, String>;

    /// Acknowledge all inbound messages from `peer_id` as read.
    async fn mark_read(&self, token: &str, peer_id: i64) -> Result<(), String>;

    /// Signal typing start/stop to `peer_id`. Best-effort.
    async fn signal_typing(&self, token: &str, peer_id: i64, is_typing: bool)
        -> Result<(), String>;

    /// Current peer → unread inbound count map.
    async fn unread_counts(&self, token: &str) -> Result<HashMap<i64, u32>, String>;
}
