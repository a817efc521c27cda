//! # Messaging API Client
//!
//! HTTP client methods for message history, sending, read acknowledgment and
//! typing signals.

use super::client::ApiClient;
use shared::dto::messaging::{
    Message, MessageHistoryResponse, SendMessageRequest, TypingRequest,
};

impl ApiClient {
    /// Fetch the full message history with a peer.
    pub async fn get_history(&self, token: &str, peer_id: i64) -> Result<Vec<Message>, String> {
        let url = format!("{}/api/messages/{}", self.base_url, peer_id);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .map_err(|e| format!("Network error: {}", e))?;

        if response.status().is_success() {
            response
                .json::<MessageHistoryResponse>()
                .await
                .map(|r| r.messages)
                .map_err(|e| format!("Failed to parse response: {}", e))
        } else {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            Err(format!("API error: {}", error_text))
        }
    }

    /// Send a message. Returns the canonical server copy.
    pub async fn post_message(
        &self,
        token: &str,
        request: &SendMessageRequest,
    ) -> Result<Message, String> {
        let url = format!("{}/api/messages", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", token))
            .json(request)
            .send()
            .await
            .map_err(|e| format!("Network error: {}", e))?;

        if response.status().is_success() {
            response
                .json::<Message>()
                .await
                .map_err(|e| format!("Failed to parse response: {}", e))
        } else {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            Err(format!("API error: {}", error_text))
        }
    }

    /// Acknowledge all inbound messages from a peer as read.
    pub async fn post_read(&self, token: &str, peer_id: i64) -> Result<(), String> {
        let url = format!("{}/api/messages/read/{}", self.base_url, peer_id);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .map_err(|e| format!("Network error: {}", e))?;

        if response.status().is_success() {
            Ok(())
        } else {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            Err(format!("API error: {}", error_text))
        }
    }

    /// Signal typing start/stop to a peer.
    pub async fn post_typing(
        &self,
        token: &str,
        peer_id: i64,
        is_typing: bool,
    ) -> Result<(), String> {
        let url = format!("{}/api/typing/{}", self.base_url, peer_id);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", token))
            .json(&TypingRequest { is_typing })
            .send()
            .await
            .map_err(|e| format!("Network error: {}", e))?;

        if response.status().is_success() {
            Ok(())
        } else {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            Err(format!("API error: {}", error_text))
        }
    }
}
