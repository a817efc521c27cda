//! # Conversation Directory
//!
//! Peer list loading, client-side search, and conversation selection.
//! Selecting a peer bumps the selection sequence number, acknowledges read
//! state, and kicks off a history refetch.

use super::state::{HistoryState, Selection};
use super::MessagingSession;
use crate::core::error::{AppError, Result};
use crate::events::AppEvent;
use shared::dto::messaging::Peer;
use std::sync::Arc;
use tracing::{info, warn};

impl MessagingSession {
    /// Fetch the peer directory from the server.
    pub fn load_peers(&self) {
        let api = Arc::clone(&self.api);
        let token = self.token.clone();
        let event_tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = api.list_peers(&token).await;
            let _ = event_tx.send(AppEvent::PeersLoaded(result)).await;
        });
    }

    pub(crate) fn handle_peers_loaded(&self, result: std::result::Result<Vec<Peer>, String>) {
        match result {
            Ok(peers) => {
                info!(peer_count = peers.len(), "Peer directory loaded");
                self.state.write().peers = peers;
            }
            Err(e) => {
                // Read-path failure: keep showing the last known directory.
                warn!(error = %e, "Failed to load peer directory");
            }
        }
    }

    /// Case-insensitive substring search over peer names, preserving server
    /// order.
    pub fn search_peers(&self, query: &str) -> Vec<Peer> {
        let needle = query.to_lowercase();
        self.state
            .read()
            .peers
            .iter()
            .filter(|peer| peer.name.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    /// Open the conversation with `peer_id`.
    ///
    /// Bumps the selection sequence number (so in-flight responses for the
    /// previous selection are discarded on arrival), acknowledges read state
    /// for the peer, and refetches its history.
    pub fn select_peer(&self, peer_id: i64) -> Result<()> {
        let (seq, stop_typing_to) = {
            let mut state = self.state.write();
            if !state.peers.iter().any(|p| p.id == peer_id) {
                return Err(AppError::Validation(format!("Unknown peer: {}", peer_id)));
            }

            let previous = state.selection;
            state.selection_seq += 1;
            let seq = state.selection_seq;
            state.selection = Some(Selection { peer_id, seq });
            state.history = HistoryState {
                peer_id: Some(peer_id),
                messages: Vec::new(),
                loading: true,
            };

            // The outbound typing signal was directed at the previous peer;
            // stop it rather than leak a dangling indicator there.
            let stop_typing_to = if state.typing.outbound_active {
                state.typing.outbound_active = false;
                state.typing.outbound_epoch = state.typing.bump_epoch();
                previous.map(|s| s.peer_id).filter(|&prev| prev != peer_id)
            } else {
                None
            };

            (seq, stop_typing_to)
        };

        info!(peer_id = peer_id, seq = seq, "Conversation selected");

        if let Some(previous_peer) = stop_typing_to {
            self.send_typing_signal(previous_peer, false);
        }
        self.acknowledge_read(peer_id);
        self.refetch_history(peer_id, seq);
        Ok(())
    }
}
