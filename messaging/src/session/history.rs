//! # Message History Cache
//!
//! Wholesale refetch of the open conversation's message list. Full
//! replacement rather than incremental append is deliberate: the server is
//! always asked for truth after any mutating or push-triggered event, which
//! eliminates local-merge bugs at the cost of some network efficiency.
//!
//! The central correctness property lives here: every history request is
//! tagged with the selection sequence number current at issue time, and a
//! response whose tag no longer matches at resolution time is discarded.
//! The displayed conversation therefore always corresponds to the current
//! selection, regardless of how fetches interleave with selection changes.

use super::MessagingSession;
use crate::events::AppEvent;
use shared::dto::messaging::Message;
use std::sync::Arc;
use tracing::{debug, warn};

impl MessagingSession {
    /// Refetch the history for `peer_id`, tagged with the selection `seq`
    /// current when the caller decided to fetch.
    pub(crate) fn refetch_history(&self, peer_id: i64, seq: u64) {
        let api = Arc::clone(&self.api);
        let token = self.token.clone();
        let event_tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = api.fetch_history(&token, peer_id).await;
            let _ = event_tx
                .send(AppEvent::HistoryLoaded { peer_id, seq, result })
                .await;
        });
    }

    /// Refetch for the currently open conversation, if any.
    pub fn refetch_current_history(&self) {
        let selection = self.state.read().selection;
        if let Some(selection) = selection {
            self.refetch_history(selection.peer_id, selection.seq);
        }
    }

    pub(crate) fn handle_history_loaded(
        &self,
        peer_id: i64,
        seq: u64,
        result: std::result::Result<Vec<Message>, String>,
    ) {
        let mut state = self.state.write();

        // Stale-response guard: the selection changed while this request was
        // in flight. Applying it would briefly display the wrong
        // conversation, so it is dropped instead.
        if state.selection.map(|s| s.seq) != Some(seq) {
            debug!(
                peer_id = peer_id,
                response_seq = seq,
                current_seq = ?state.selection.map(|s| s.seq),
                "Discarding stale history response"
            );
            return;
        }

        state.history.loading = false;
        match result {
            Ok(mut messages) => {
                // Ascending by creation time; message id breaks timestamp
                // ties so the order is deterministic.
                messages.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
                state.history.peer_id = Some(peer_id);
                state.history.messages = messages;
            }
            Err(e) => {
                // Read-path failure: degrade to the stale-but-consistent
                // cached list rather than surfacing an error.
                warn!(peer_id = peer_id, error = %e, "Failed to refetch history");
            }
        }
    }
}
