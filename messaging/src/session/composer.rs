//! # Message Composer
//!
//! Builds and sends outbound messages. Sends are serialized: a second send
//! while one is in flight is rejected. Composed content is never lost — it
//! sits in the in-flight slot until the server acknowledges, and on failure
//! moves to a failed slot, is restored to the input, and can be re-attempted
//! with [`MessagingSession::retry_send`]. A successful send triggers a
//! history refetch (no local append; the server copy is the one displayed).

use super::MessagingSession;
use crate::core::error::{AppError, Result};
use crate::events::AppEvent;
use shared::dto::messaging::{Message, SendMessageRequest};
use std::sync::Arc;
use tracing::{info, warn};

impl MessagingSession {
    /// Send the current input as a text message to the selected peer.
    pub fn send_draft(&self) -> Result<()> {
        let (peer_id, text) = {
            let state = self.state.read();
            let peer_id = state
                .selected_peer_id()
                .ok_or_else(|| AppError::State("No conversation selected".to_string()))?;
            (peer_id, state.composer.input.clone())
        };
        self.send_message(SendMessageRequest::text(peer_id, text))
    }

    /// Send a message.
    ///
    /// Rejects empty payloads and sends issued while another send is in
    /// flight. The input is cleared optimistically but the content is held
    /// in the in-flight slot until the server confirms.
    pub fn send_message(&self, request: SendMessageRequest) -> Result<()> {
        if request.message.trim().is_empty()
            && request.attachment.is_none()
            && request.property_ref.is_none()
        {
            return Err(AppError::Validation("Message is empty".to_string()));
        }

        let stop_typing_to = {
            let mut state = self.state.write();
            if state.composer.sending {
                return Err(AppError::State("A send is already in flight".to_string()));
            }
            state.composer.sending = true;
            state.composer.in_flight = Some(request.clone());
            state.composer.last_error = None;
            if state.composer.input == request.message {
                state.composer.input.clear();
            }
            // Sending counts as done typing.
            if state.typing.outbound_active {
                state.typing.outbound_active = false;
                state.typing.outbound_epoch = state.typing.bump_epoch();
                Some(request.receiver_id)
            } else {
                None
            }
        };

        if let Some(peer_id) = stop_typing_to {
            self.send_typing_signal(peer_id, false);
        }

        let api = Arc::clone(&self.api);
        let token = self.token.clone();
        let event_tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = api.send_message(&token, request.clone()).await;
            let _ = event_tx
                .send(AppEvent::SendCompleted { request, result })
                .await;
        });
        Ok(())
    }

    /// Re-attempt the last failed send.
    pub fn retry_send(&self) -> Result<()> {
        let request = self
            .state
            .write()
            .composer
            .failed
            .take()
            .ok_or_else(|| AppError::State("No failed send to retry".to_string()))?;

        if let Err(e) = self.send_message(request.clone()) {
            // Put the content back so it is still retryable.
            self.state.write().composer.failed = Some(request);
            return Err(e);
        }
        Ok(())
    }

    pub(crate) fn handle_send_completed(
        &self,
        request: SendMessageRequest,
        result: std::result::Result<Message, String>,
    ) {
        match result {
            Ok(message) => {
                let refetch = {
                    let mut state = self.state.write();
                    state.composer.sending = false;
                    state.composer.in_flight = None;
                    state.composer.failed = None;
                    state.composer.last_error = None;
                    state.selection.filter(|s| s.peer_id == request.receiver_id)
                };
                info!(
                    message_id = message.id,
                    peer_id = request.receiver_id,
                    "Message sent"
                );
                if let Some(selection) = refetch {
                    self.refetch_history(selection.peer_id, selection.seq);
                }
            }
            Err(e) => {
                // Send failures are surfaced: silent message loss is not
                // acceptable. Content goes back to the input, retryable.
                warn!(peer_id = request.receiver_id, error = %e, "Send failed; content retained");
                let mut state = self.state.write();
                state.composer.sending = false;
                state.composer.in_flight = None;
                if state.composer.input.is_empty() {
                    state.composer.input = request.message.clone();
                }
                state.composer.last_error = Some(e);
                state.composer.failed = Some(request);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::testutil::{pump, MockApi};
    use crate::session::MessagingSession;
    use shared::dto::messaging::SendMessageRequest;
    use std::sync::Arc;
    use std::time::Duration;

    async fn ready_session() -> (Arc<MockApi>, MessagingSession) {
        let api = Arc::new(MockApi::new(1, vec![MockApi::peer(2, "Alice")]));
        let session = MessagingSession::new(Arc::clone(&api) as Arc<dyn crate::core::service::MessagingApi>, 1, "token");
        session.start();
        pump(&session).await;
        session.select_peer(2).unwrap();
        pump(&session).await;
        (api, session)
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn sent_message_appears_exactly_once_after_refetch() {
        let (_api, session) = ready_session().await;

        session.input_changed("hello alice");
        session.send_draft().unwrap();
        pump(&session).await;

        let state = session.state();
        let state = state.read();
        let occurrences = state
            .history
            .messages
            .iter()
            .filter(|m| m.message == "hello alice")
            .count();
        assert_eq!(occurrences, 1);
        assert!(state.composer.input.is_empty());
        assert!(!state.composer.sending);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn second_send_while_in_flight_is_rejected() {
        let (api, session) = ready_session().await;
        api.state.lock().send_delay = Duration::from_millis(200);

        session.send_message(SendMessageRequest::text(2, "first")).unwrap();
        let err = session
            .send_message(SendMessageRequest::text(2, "second"))
            .unwrap_err();
        assert!(err.to_string().contains("in flight"));

        // Let the in-flight task register its delay before advancing.
        pump(&session).await;
        tokio::time::advance(Duration::from_millis(250)).await;
        pump(&session).await;
        assert_eq!(api.state.lock().histories[&2].len(), 1);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn empty_message_is_rejected() {
        let (_api, session) = ready_session().await;
        assert!(session.send_message(SendMessageRequest::text(2, "   ")).is_err());
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn failed_send_restores_content_and_retry_succeeds() {
        let (api, session) = ready_session().await;
        api.state.lock().fail_sends = true;

        session.input_changed("important words");
        session.send_draft().unwrap();
        // Input cleared optimistically while the send is in flight.
        assert!(session.state().read().composer.input.is_empty());
        pump(&session).await;

        {
            let state = session.state();
            let state = state.read();
            assert_eq!(state.composer.input, "important words");
            assert!(state.composer.failed.is_some());
            assert!(state.composer.last_error.is_some());
            assert!(!state.composer.sending);
        }

        api.state.lock().fail_sends = false;
        session.retry_send().unwrap();
        pump(&session).await;

        let state = session.state();
        let state = state.read();
        assert!(state.composer.failed.is_none());
        assert!(state.composer.last_error.is_none());
        assert_eq!(
            state
                .history
                .messages
                .iter()
                .filter(|m| m.message == "important words")
                .count(),
            1
        );
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn retry_without_failure_is_an_error() {
        let (_api, session) = ready_session().await;
        assert!(session.retry_send().is_err());
    }
}
