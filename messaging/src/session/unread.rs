//! # Unread Count Aggregator
//!
//! Maintains the peer → unread-count map by wholesale replacement from the
//! server: on subsystem start, after every inbound `message.sent` event
//! (whatever conversation is open), and after every successful read
//! acknowledgment. Counts are unsigned by construction and a peer absent
//! from the map reads as zero.

use super::MessagingSession;
use crate::events::AppEvent;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

impl MessagingSession {
    /// Replace the unread-count map from the server.
    pub fn refresh_unread(&self) {
        let api = Arc::clone(&self.api);
        let token = self.token.clone();
        let event_tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = api.unread_counts(&token).await;
            let _ = event_tx.send(AppEvent::UnreadCountsLoaded(result)).await;
        });
    }

    /// Unread inbound count for a peer; absent means zero.
    pub fn unread_count(&self, peer_id: i64) -> u32 {
        self.state.read().unread_count(peer_id)
    }

    pub(crate) fn handle_unread_counts(
        &self,
        result: std::result::Result<HashMap<i64, u32>, String>,
    ) {
        match result {
            Ok(counts) => {
                self.state.write().unread = counts;
            }
            Err(e) => {
                // Read-path failure: the last known map stays on display.
                warn!(error = %e, "Failed to refresh unread counts");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::testutil::{pump, MockApi};
    use crate::events::AppEvent;
    use crate::session::MessagingSession;
    use std::sync::Arc;

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn counts_track_inbound_messages_since_last_ack() {
        let api = Arc::new(MockApi::new(
            1,
            vec![MockApi::peer(2, "Alice"), MockApi::peer(3, "Bob")],
        ));
        let session = MessagingSession::new(Arc::clone(&api) as Arc<dyn crate::core::service::MessagingApi>, 1, "token");
        session.start();
        pump(&session).await;

        for _ in 0..3 {
            let event = api.peer_sends(2, "ping");
            session.handle_event(AppEvent::MessageSent(event));
        }
        let event = api.peer_sends(3, "hello");
        session.handle_event(AppEvent::MessageSent(event));
        pump(&session).await;

        assert_eq!(session.unread_count(2), 3);
        assert_eq!(session.unread_count(3), 1);
        // Absent peer reads as zero.
        assert_eq!(session.unread_count(42), 0);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn repeated_ack_is_idempotent() {
        let api = Arc::new(MockApi::new(1, vec![MockApi::peer(2, "Alice")]));
        api.peer_sends(2, "hi");
        let session = MessagingSession::new(Arc::clone(&api) as Arc<dyn crate::core::service::MessagingApi>, 1, "token");
        session.start();
        pump(&session).await;
        assert_eq!(session.unread_count(2), 1);

        session.acknowledge_read(2);
        pump(&session).await;
        assert_eq!(session.unread_count(2), 0);

        session.acknowledge_read(2);
        pump(&session).await;
        assert_eq!(session.unread_count(2), 0);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn refresh_failure_keeps_last_known_counts() {
        let api = Arc::new(MockApi::new(1, vec![MockApi::peer(2, "Alice")]));
        api.peer_sends(2, "hi");
        let session = MessagingSession::new(Arc::clone(&api) as Arc<dyn crate::core::service::MessagingApi>, 1, "token");
        session.start();
        pump(&session).await;
        assert_eq!(session.unread_count(2), 1);

        api.state.lock().fail_reads = true;
        session.refresh_unread();
        pump(&session).await;
        assert_eq!(session.unread_count(2), 1);
    }
}
