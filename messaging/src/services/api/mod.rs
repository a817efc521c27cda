//! # Backend API Client Module
//!
//! HTTP client for the marketplace backend's messaging endpoints.
//!
//! ## Module Structure
//!
//! ```text
//! api/
//! ├── mod.rs      - Module exports
//! ├── client.rs   - ApiClient struct, retry policy, MessagingApi impl
//! ├── peers.rs    - Peer directory and unread-count endpoints
//! └── messages.rs - History, send, read-ack and typing endpoints
//! ```

pub mod client;
pub mod messages;
pub mod peers;

pub use client::ApiClient;
