//! # Configuration
//!
//! Environment-driven configuration for the messaging core. Only two knobs
//! exist: the REST base URL and the event-channel URL derived from it.

/// Default base URL for the backend API server.
const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:3001";

/// Runtime configuration for the messaging subsystem.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL for REST requests, e.g. `http://127.0.0.1:3001`.
    pub api_base_url: String,
}

impl Config {
    /// Build a config from the environment, falling back to the local
    /// development backend.
    ///
    /// Honors `API_BASE_URL`.
    pub fn from_env() -> Self {
        let api_base_url = std::env::var("API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());
        Self { api_base_url }
    }

    /// WebSocket URL for the per-user private event channels.
    pub fn event_channel_url(&self) -> String {
        self.api_base_url
            .replace("http://", "ws://")
            .replace("https://", "wss://")
            + "/ws/events"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }
}
