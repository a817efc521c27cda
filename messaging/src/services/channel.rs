//! # Event Channel Subscriber
//!
//! WebSocket subscriber for the per-user private event channels:
//! `private-send-message.{userId}` (event `message.sent`) and
//! `private-is-typing.{userId}` (event `is-typing`).
//!
//! The subscriber maintains one connection, re-subscribing after reconnects
//! with exponential backoff, and forwards parsed events onto the
//! [`AppEvent`] bus. Delivery is at-least-once while connected; events lost
//! during a disconnect window are NOT replayed — the session compensates by
//! resyncing (unread counts + open history) when the connection recovers.
//!
//! Connection lifetime is reference-counted through [`ChannelManager`]: the
//! connect loop starts with the first acquired [`ChannelGuard`] and is
//! aborted when the last guard drops, independent of any single view.

use crate::config::Config;
use crate::events::AppEvent;
use crate::session::state::{ChannelState, ChannelStatus};
use async_channel::Sender;
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// Consecutive connection failures before the channel is disabled.
const MAX_CONNECTION_ATTEMPTS: u64 = 5;
/// Cap for the reconnect backoff delay.
const MAX_RECONNECT_DELAY: Duration = Duration::from_secs(60);

/// Frame sent after connecting to subscribe to a private channel.
#[derive(Debug, Serialize)]
struct SubscribeFrame<'a> {
    event: &'static str,
    channel: String,
    auth: &'a str,
}

/// Envelope wrapping every event pushed on a subscribed channel.
#[derive(Debug, Deserialize)]
struct ChannelEnvelope {
    #[allow(dead_code)]
    channel: String,
    event: String,
    data: serde_json::Value,
}

/// Parameters of the per-user subscription.
#[derive(Debug, Clone)]
pub struct ChannelSession {
    pub user_id: i64,
    pub token: String,
}

/// Reference-counted owner of the event-channel connection.
///
/// Multiple views may hold a [`ChannelGuard`] at once; the underlying
/// connect loop runs exactly once and stops when the last guard drops.
pub struct ChannelManager {
    config: Config,
    session: ChannelSession,
    event_tx: Sender<AppEvent>,
    active: Mutex<Weak<ConnectionHandle>>,
}

/// Guard keeping the channel connection alive.
pub type ChannelGuard = Arc<ConnectionHandle>;

/// Aborts the connect loop when dropped.
pub struct ConnectionHandle {
    task: JoinHandle<()>,
}

impl Drop for ConnectionHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl ChannelManager {
    pub fn new(config: Config, session: ChannelSession, event_tx: Sender<AppEvent>) -> Self {
        Self {
            config,
            session,
            event_tx,
            active: Mutex::new(Weak::new()),
        }
    }

    /// Acquire a guard on the shared connection, starting it if necessary.
    pub fn acquire(&self) -> ChannelGuard {
        let mut active = self.active.lock();
        if let Some(handle) = active.upgrade() {
            return handle;
        }

        let config = self.config.clone();
        let session = self.session.clone();
        let event_tx = self.event_tx.clone();
        let task = tokio::spawn(async move {
            run_event_channel(config, session, event_tx).await;
        });

        let handle = Arc::new(ConnectionHandle { task });
        *active = Arc::downgrade(&handle);
        handle
    }
}

/// Connect to the event channel and forward events until aborted.
///
/// Handles connection establishment, private-channel subscription,
/// automatic reconnection with exponential backoff (bounded attempts), and
/// envelope parsing. Status transitions are reported as
/// [`AppEvent::ChannelStatus`].
pub async fn run_event_channel(
    config: Config,
    session: ChannelSession,
    event_tx: Sender<AppEvent>,
) {
    let url = config.event_channel_url();
    info!(url = %url, user_id = session.user_id, "Connecting to event channel");

    let mut status = ChannelStatus::default();
    let mut reconnect_delay = Duration::from_secs(1);
    let mut consecutive_failures = 0u64;

    loop {
        status.state = if status.connection_attempts == 0 {
            ChannelState::Connecting
        } else {
            ChannelState::Reconnecting
        };
        status.connection_attempts += 1;
        let _ = event_tx.send(AppEvent::ChannelStatus(status.clone())).await;

        match tokio_tungstenite::connect_async(&url).await {
            Ok((ws_stream, response)) => {
                info!(
                    url = %url,
                    http_status = ?response.status(),
                    attempt = status.connection_attempts,
                    "Event channel connected"
                );
                consecutive_failures = 0;
                reconnect_delay = Duration::from_secs(1);

                let (mut write, mut read) = ws_stream.split();

                if let Err(e) = subscribe_private_channels(&mut write, &session).await {
                    error!(error = %e, "Failed to subscribe to private channels");
                    status.last_error = Some(e);
                } else {
                    status.state = ChannelState::Connected;
                    status.last_error = None;
                    let _ = event_tx.send(AppEvent::ChannelStatus(status.clone())).await;

                    read_events(&mut read, &mut write, &event_tx, &mut status).await;
                }

                warn!("Event channel connection lost, reconnecting");
            }
            Err(e) => {
                consecutive_failures += 1;
                status.last_error = Some(e.to_string());
                error!(
                    url = %url,
                    error = %e,
                    consecutive_failures = consecutive_failures,
                    max_attempts = MAX_CONNECTION_ATTEMPTS,
                    "Failed to connect to event channel"
                );

                if consecutive_failures >= MAX_CONNECTION_ATTEMPTS {
                    status.state = ChannelState::Disabled;
                    let _ = event_tx.send(AppEvent::ChannelStatus(status.clone())).await;
                    error!(
                        consecutive_failures = consecutive_failures,
                        "Maximum connection attempts reached, disabling event channel"
                    );
                    return;
                }
            }
        }

        sleep(reconnect_delay).await;
        reconnect_delay = (reconnect_delay * 2).min(MAX_RECONNECT_DELAY);
    }
}

/// Send the subscribe frames for both per-user private channels.
async fn subscribe_private_channels<S>(
    write: &mut S,
    session: &ChannelSession,
) -> Result<(), String>
where
    S: SinkExt<tokio_tungstenite::tungstenite::Message> + Unpin,
    S::Error: std::fmt::Display,
{
    for channel in [
        format!("private-send-message.{}", session.user_id),
        format!("private-is-typing.{}", session.user_id),
    ] {
        let frame = SubscribeFrame {
            event: "subscribe",
            channel,
            auth: &session.token,
        };
        let text = serde_json::to_string(&frame)
            .map_err(|e| format!("Failed to serialize subscribe frame: {}", e))?;
        write
            .send(tokio_tungstenite::tungstenite::Message::Text(text.into()))
            .await
            .map_err(|e| format!("Failed to send subscribe frame: {}", e))?;
    }
    Ok(())
}

/// Read frames until the connection drops, dispatching parsed events.
async fn read_events<R, W>(
    read: &mut R,
    write: &mut W,
    event_tx: &Sender<AppEvent>,
    status: &mut ChannelStatus,
) where
    R: StreamExt<
            Item = Result<
                tokio_tungstenite::tungstenite::Message,
                tokio_tungstenite::tungstenite::Error,
            >,
        > + Unpin,
    W: SinkExt<tokio_tungstenite::tungstenite::Message> + Unpin,
{
    use tokio_tungstenite::tungstenite::Message as WsMessage;

    while let Some(frame) = read.next().await {
        match frame {
            Ok(WsMessage::Text(text)) => {
                if let Some(event) = parse_channel_event(&text) {
                    status.events_received += 1;
                    if event_tx.send(event).await.is_err() {
                        // Session dropped the receiver; nothing left to do.
                        return;
                    }
                }
            }
            Ok(WsMessage::Ping(data)) => {
                if write.send(WsMessage::Pong(data)).await.is_err() {
                    break;
                }
            }
            Ok(WsMessage::Close(frame)) => {
                info!(frame = ?frame, "Event channel closed by server");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                error!(error = %e, "Event channel read error");
                break;
            }
        }
    }
}

/// Parse one channel envelope into an [`AppEvent`].
///
/// Unknown events are ignored; malformed payloads for known events are
/// logged and dropped rather than tearing the connection down.
fn parse_channel_event(text: &str) -> Option<AppEvent> {
    let envelope: ChannelEnvelope = match serde_json::from_str(text) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(error = %e, "Failed to parse channel envelope");
            return None;
        }
    };

    match envelope.event.as_str() {
        "message.sent" => match serde_json::from_value(envelope.data) {
            Ok(payload) => Some(AppEvent::MessageSent(payload)),
            Err(e) => {
                warn!(error = %e, "Malformed message.sent payload");
                None
            }
        },
        "is-typing" => match serde_json::from_value(envelope.data) {
            Ok(payload) => Some(AppEvent::PeerTyping(payload)),
            Err(e) => {
                warn!(error = %e, "Malformed is-typing payload");
                None
            }
        },
        other => {
            debug!(event = other, "Ignoring unknown channel event");
            None
        }
    }
}
