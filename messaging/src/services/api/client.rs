//! # API Client
//!
//! Main HTTP client for backend API communication.

use crate::config::Config;
use crate::core::service::MessagingApi;
use reqwest::Client;
use shared::dto::messaging::{Message, Peer, SendMessageRequest};
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Maximum attempts for idempotent read requests.
const MAX_READ_ATTEMPTS: u32 = 3;
/// Initial delay before a read retry; doubles per attempt.
const READ_RETRY_BASE_DELAY: Duration = Duration::from_millis(250);

/// HTTP client for communicating with the backend API server.
///
/// Handles all REST calls of the messaging core and maintains a connection
/// pool for HTTP/2 multiplexing. Idempotent reads (peer list, history,
/// unread counts) retry with bounded exponential backoff; mutating calls
/// (send, read ack, typing) are attempted once and surfaced to the caller.
pub struct ApiClient {
    pub(crate) client: Client,
    pub(crate) base_url: String,
}

impl ApiClient {
    /// Create a new API client with default configuration.
    ///
    /// The client is configured with a 10 second timeout to prevent hanging
    /// requests from stalling refresh cycles.
    pub fn new(config: &Config) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: config.api_base_url.clone(),
        }
    }

    /// Run an idempotent read with bounded exponential backoff.
    ///
    /// Only safe for GETs: the operation may execute up to
    /// [`MAX_READ_ATTEMPTS`] times.
    pub(crate) async fn retry_read<T, F, Fut>(&self, operation: &str, f: F) -> Result<T, String>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, String>>,
    {
        let mut delay = READ_RETRY_BASE_DELAY;
        let mut last_error = String::new();

        for attempt in 1..=MAX_READ_ATTEMPTS {
            match f().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    warn!(
                        operation = operation,
                        attempt = attempt,
                        max_attempts = MAX_READ_ATTEMPTS,
                        error = %e,
                        "Read request failed"
                    );
                    last_error = e;
                }
            }
            if attempt < MAX_READ_ATTEMPTS {
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
        }

        Err(last_error)
    }
}

#[async_trait::async_trait]
impl MessagingApi for ApiClient {
    async fn list_peers(&self, token: &str) -> Result<Vec<Peer>, String> {
        self.retry_read("list_peers", || self.get_peers(token)).await
    }

    async fn fetch_history(&self, token: &str, peer_id: i64) -> Result<Vec<Message>, String> {
        self.retry_read("fetch_history", || self.get_history(token, peer_id))
            .await
    }

    async fn send_message(
        &self,
        token: &str,
        request: SendMessageRequest,
    ) -> Result<Message, String> {
        self.post_message(token, &request).await
    }

    async fn mark_read(&self, token: &str, peer_id: i64) -> Result<(), String> {
        self.post_read(token, peer_id).await
    }

    async fn signal_typing(&self, token: &str, peer_id: i64, is_typing: bool) -> Result<(), String> {
        self.post_typing(token, peer_id, is_typing).await
    }

    async fn unread_counts(&self, token: &str) -> Result<HashMap<i64, u32>, String> {
        self.retry_read("unread_counts", || self.get_unread_counts(token))
            .await
    }
}
