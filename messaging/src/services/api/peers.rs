//! # Peer Directory API Client
//!
//! HTTP client methods for the conversation-counterpart directory and the
//! unread-count map.

use super::client::ApiClient;
use shared::dto::messaging::{Peer, PeersResponse, UnreadCountsResponse};
use std::collections::HashMap;

impl ApiClient {
    /// List conversation counterparts for the current user.
    pub async fn get_peers(&self, token: &str) -> Result<Vec<Peer>, String> {
        let url = format!("{}/api/peers", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .map_err(|e| format!("Network error: {}", e))?;

        if response.status().is_success() {
            response
                .json::<PeersResponse>()
                .await
                .map(|r| r.peers)
                .map_err(|e| format!("Failed to parse response: {}", e))
        } else {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            Err(format!("API error: {}", error_text))
        }
    }

    /// Get the peer → unread inbound count map.
    pub async fn get_unread_counts(&self, token: &str) -> Result<HashMap<i64, u32>, String> {
        let url = format!("{}/api/messages/unread-counts", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .map_err(|e| format!("Network error: {}", e))?;

        if response.status().is_success() {
            response
                .json::<UnreadCountsResponse>()
                .await
                .map(|r| r.counts)
                .map_err(|e| format!("Failed to parse response: {}", e))
        } else {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            Err(format!("API error: {}", error_text))
        }
    }
}
