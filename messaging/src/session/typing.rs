//! # Typing Indicator Controller
//!
//! Inbound: tracks the selected peer's ephemeral typing signal. A signal is
//! active only within a fixed expiry window of its last renewal; renewal
//! replaces the timer (extends, never stacks). Expiry is implemented with an
//! epoch compare rather than timer cancellation: a sleep armed for an older
//! renewal simply loses the compare when it fires.
//!
//! Outbound: signals "typing" to the server immediately on every input
//! change (no debounce on the start signal) and an explicit "stopped" once
//! the idle window elapses without further input. The receiver-side expiry
//! stays in place as the safety net for lost stop signals.
//!
//! Typing signals are best-effort; transport failures are logged at debug
//! level and otherwise ignored, since the indicator self-expires anyway.

use super::MessagingSession;
use crate::events::AppEvent;
use shared::dto::messaging::TypingSignalEvent;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Inbound typing signals expire this long after their last renewal.
pub const TYPING_EXPIRY: Duration = Duration::from_millis(1500);
/// Outbound "stopped typing" is signaled after this much keyboard idle time.
pub const TYPING_IDLE: Duration = Duration::from_millis(800);

impl MessagingSession {
    /// True while `peer_id` has an unexpired inbound typing signal.
    pub fn is_peer_typing(&self, peer_id: i64) -> bool {
        self.state.read().is_peer_typing(peer_id)
    }

    /// Record a local input change: update the draft, signal typing start
    /// to the selected peer, and re-arm the outbound idle timer.
    pub fn input_changed(&self, text: &str) {
        enum Outbound {
            Start { epoch: u64 },
            Stop,
            Nothing,
        }

        let (peer_id, outbound) = {
            let mut state = self.state.write();
            state.composer.input = text.to_string();
            let Some(peer_id) = state.selected_peer_id() else {
                return;
            };

            let outbound = if text.is_empty() {
                if state.typing.outbound_active {
                    state.typing.outbound_active = false;
                    state.typing.outbound_epoch = state.typing.bump_epoch();
                    Outbound::Stop
                } else {
                    Outbound::Nothing
                }
            } else {
                state.typing.outbound_active = true;
                let epoch = state.typing.bump_epoch();
                state.typing.outbound_epoch = epoch;
                Outbound::Start { epoch }
            };
            (peer_id, outbound)
        };

        match outbound {
            Outbound::Start { epoch } => {
                self.send_typing_signal(peer_id, true);
                self.arm_idle_timer(epoch);
            }
            Outbound::Stop => self.send_typing_signal(peer_id, false),
            Outbound::Nothing => {}
        }
    }

    /// Fire-and-forget typing signal to the server.
    pub(crate) fn send_typing_signal(&self, peer_id: i64, is_typing: bool) {
        let api = Arc::clone(&self.api);
        let token = self.token.clone();
        tokio::spawn(async move {
            if let Err(e) = api.signal_typing(&token, peer_id, is_typing).await {
                // Best-effort: the receiver's expiry covers a lost signal.
                debug!(peer_id = peer_id, is_typing = is_typing, error = %e, "Typing signal failed");
            }
        });
    }

    fn arm_idle_timer(&self, epoch: u64) {
        let event_tx = self.event_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(TYPING_IDLE).await;
            let _ = event_tx.send(AppEvent::TypingIdle { epoch }).await;
        });
    }

    /// Inbound `is-typing` push event. Only the currently selected peer is
    /// tracked; events for other peers are ignored.
    pub(crate) fn handle_peer_typing(&self, event: TypingSignalEvent) {
        let armed = {
            let mut state = self.state.write();
            if state.selected_peer_id() != Some(event.sender_user_id) {
                return;
            }
            if !event.is_typing {
                // Explicit stop clears immediately; no need to wait out the
                // expiry window.
                state.typing.inbound.remove(&event.sender_user_id);
                return;
            }
            let epoch = state.typing.bump_epoch();
            state.typing.inbound.insert(event.sender_user_id, epoch);
            epoch
        };

        let peer_id = event.sender_user_id;
        let event_tx = self.event_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(TYPING_EXPIRY).await;
            let _ = event_tx
                .send(AppEvent::TypingExpired { peer_id, epoch: armed })
                .await;
        });
    }

    pub(crate) fn handle_typing_expired(&self, peer_id: i64, epoch: u64) {
        let mut state = self.state.write();
        // A renewal after this timer was armed replaced the epoch; only the
        // timer for the latest renewal may clear the signal.
        if state.typing.inbound.get(&peer_id) == Some(&epoch) {
            state.typing.inbound.remove(&peer_id);
        }
    }

    pub(crate) fn handle_typing_idle(&self, epoch: u64) {
        let stop_to = {
            let mut state = self.state.write();
            if state.typing.outbound_active && state.typing.outbound_epoch == epoch {
                state.typing.outbound_active = false;
                state.selected_peer_id()
            } else {
                None
            }
        };
        if let Some(peer_id) = stop_to {
            self.send_typing_signal(peer_id, false);
        }
    }
}
