//! # Event Handler
//!
//! Applies results from background tasks and push events from the event
//! channel to session state. Write locks are acquired per event for minimal
//! duration, inside the component handlers.

use super::state::{ChannelState, ChannelStatus};
use super::MessagingSession;
use crate::events::AppEvent;
use shared::dto::messaging::MessageSentEvent;
use tracing::info;

impl MessagingSession {
    /// Apply one event from the bus.
    ///
    /// The host drains [`MessagingSession::events`] and feeds each event
    /// here; handlers never block and never await.
    pub fn handle_event(&self, event: AppEvent) {
        match event {
            AppEvent::PeersLoaded(result) => self.handle_peers_loaded(result),
            AppEvent::HistoryLoaded {
                peer_id,
                seq,
                result,
            } => self.handle_history_loaded(peer_id, seq, result),
            AppEvent::UnreadCountsLoaded(result) => self.handle_unread_counts(result),
            AppEvent::SendCompleted { request, result } => {
                self.handle_send_completed(request, result)
            }
            AppEvent::ReadAcknowledged { peer_id, result } => {
                self.handle_read_acknowledged(peer_id, result)
            }
            AppEvent::MessageSent(event) => self.handle_message_sent(event),
            AppEvent::PeerTyping(event) => self.handle_peer_typing(event),
            AppEvent::TypingExpired { peer_id, epoch } => {
                self.handle_typing_expired(peer_id, epoch)
            }
            AppEvent::TypingIdle { epoch } => self.handle_typing_idle(epoch),
            AppEvent::ChannelStatus(status) => self.handle_channel_status(status),
        }
    }

    /// Inbound `message.sent` push event.
    ///
    /// Unread counts refresh unconditionally. When the sender is the
    /// currently open conversation the history is refetched and the read
    /// state re-acknowledged, so the open view never shows an unread badge
    /// for itself. A sender missing from the cached directory triggers a
    /// directory reload.
    fn handle_message_sent(&self, event: MessageSentEvent) {
        let (selection, known_sender) = {
            let state = self.state.read();
            (
                state
                    .selection
                    .filter(|s| s.peer_id == event.sender_user_id),
                state.peers.iter().any(|p| p.id == event.sender_user_id),
            )
        };

        self.refresh_unread();

        if let Some(selection) = selection {
            self.refetch_history(selection.peer_id, selection.seq);
            self.acknowledge_read(selection.peer_id);
        }
        if !known_sender {
            self.load_peers();
        }
    }

    /// Event-channel status transition.
    ///
    /// Recovering from a drop means events may have been lost in the
    /// disconnect window, so the session resyncs: unread counts always,
    /// plus the open conversation's history.
    fn handle_channel_status(&self, status: ChannelStatus) {
        let (previous, selection) = {
            let mut state = self.state.write();
            let previous = std::mem::replace(&mut state.channel, status.clone()).state;
            (previous, state.selection)
        };

        let recovered =
            status.state == ChannelState::Connected && previous == ChannelState::Reconnecting;
        if recovered {
            info!("Event channel recovered; resyncing");
            self.refresh_unread();
            if let Some(selection) = selection {
                self.refetch_history(selection.peer_id, selection.seq);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::testutil::{pump, MockApi};
    use super::*;
    use crate::session::MessagingSession;
    use std::sync::Arc;

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn unread_then_open_scenario() {
        let api = Arc::new(MockApi::new(1, vec![MockApi::peer(2, "Alice")]));
        let session = MessagingSession::new(Arc::clone(&api) as Arc<dyn crate::core::service::MessagingApi>, 1, "token");
        session.start();
        pump(&session).await;

        // Peer 2 sends 3 messages while the conversation is not open.
        for body in ["one", "two", "three"] {
            let event = api.peer_sends(2, body);
            session.handle_event(AppEvent::MessageSent(event));
        }
        pump(&session).await;
        assert_eq!(session.unread_count(2), 3);

        // Opening the conversation clears the badge and shows the history
        // in ascending order.
        session.select_peer(2).unwrap();
        pump(&session).await;

        let state = session.state();
        let state = state.read();
        assert_eq!(state.unread_count(2), 0);
        let bodies: Vec<&str> = state
            .history
            .messages
            .iter()
            .map(|m| m.message.as_str())
            .collect();
        assert_eq!(bodies, vec!["one", "two", "three"]);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn message_for_open_conversation_refetches_and_acks() {
        let api = Arc::new(MockApi::new(1, vec![MockApi::peer(2, "Alice")]));
        let session = MessagingSession::new(Arc::clone(&api) as Arc<dyn crate::core::service::MessagingApi>, 1, "token");
        session.start();
        pump(&session).await;
        session.select_peer(2).unwrap();
        pump(&session).await;

        let event = api.peer_sends(2, "while open");
        session.handle_event(AppEvent::MessageSent(event));
        pump(&session).await;

        let state = session.state();
        let state = state.read();
        assert_eq!(state.history.messages.len(), 1);
        assert_eq!(state.unread_count(2), 0);
        // Initial selection ack plus the ack for the inbound event.
        assert_eq!(api.state.lock().read_log, vec![2, 2]);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn message_from_unknown_sender_reloads_directory() {
        let api = Arc::new(MockApi::new(1, vec![MockApi::peer(2, "Alice")]));
        let session = MessagingSession::new(Arc::clone(&api) as Arc<dyn crate::core::service::MessagingApi>, 1, "token");
        session.start();
        pump(&session).await;

        // A new counterpart appears server-side and messages us.
        api.state.lock().peers.push(MockApi::peer(5, "Newcomer"));
        let event = api.peer_sends(5, "hi, about the listing");
        session.handle_event(AppEvent::MessageSent(event));
        pump(&session).await;

        let state = session.state();
        let state = state.read();
        assert!(state.peers.iter().any(|p| p.id == 5));
        assert_eq!(state.unread_count(5), 1);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn reconnect_resyncs_unread_and_open_history() {
        let api = Arc::new(MockApi::new(1, vec![MockApi::peer(2, "Alice")]));
        let session = MessagingSession::new(Arc::clone(&api) as Arc<dyn crate::core::service::MessagingApi>, 1, "token");
        session.start();
        pump(&session).await;
        session.select_peer(2).unwrap();
        pump(&session).await;

        let connected = ChannelStatus {
            state: ChannelState::Connected,
            connection_attempts: 1,
            ..Default::default()
        };
        session.handle_event(AppEvent::ChannelStatus(connected.clone()));

        // Messages arrive server-side during a disconnect window; no push
        // events are delivered for them.
        api.peer_sends(2, "lost in the gap");
        session.handle_event(AppEvent::ChannelStatus(ChannelStatus {
            state: ChannelState::Reconnecting,
            connection_attempts: 2,
            ..Default::default()
        }));
        session.handle_event(AppEvent::ChannelStatus(ChannelStatus {
            state: ChannelState::Connected,
            connection_attempts: 2,
            ..Default::default()
        }));
        pump(&session).await;

        let state = session.state();
        let state = state.read();
        assert_eq!(state.history.messages.len(), 1);
        assert_eq!(state.history.messages[0].message, "lost in the gap");
        assert_eq!(state.unread_count(2), 1);
    }
}
