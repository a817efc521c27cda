//! # Read-Receipt Synchronizer
//!
//! Tells the server that all currently-known inbound messages from a peer
//! are read, then refreshes the unread-count map. Invoked on conversation
//! selection and on inbound `message.sent` events for the selected peer.
//! Acknowledging an already-read peer is idempotent.

use super::MessagingSession;
use crate::events::AppEvent;
use std::sync::Arc;
use tracing::warn;

impl MessagingSession {
    /// Acknowledge all inbound messages from `peer_id` as read.
    pub fn acknowledge_read(&self, peer_id: i64) {
        let api = Arc::clone(&self.api);
        let token = self.token.clone();
        let event_tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = api.mark_read(&token, peer_id).await;
            let _ = event_tx
                .send(AppEvent::ReadAcknowledged { peer_id, result })
                .await;
        });
    }

    pub(crate) fn handle_read_acknowledged(
        &self,
        peer_id: i64,
        result: std::result::Result<(), String>,
    ) {
        match result {
            Ok(()) => self.refresh_unread(),
            Err(e) => {
                // The count stays non-zero locally; the next selection or
                // inbound event retries the acknowledgment.
                warn!(peer_id = peer_id, error = %e, "Read acknowledgment failed");
            }
        }
    }
}
