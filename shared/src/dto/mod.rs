//! # Data Transfer Objects (DTOs)
//!
//! All data structures used for communication between the messaging client
//! and the marketplace backend, over both the REST API and the event channel.
//!
//! ## Module Organization
//!
//! - [`messaging`] - Peers, message history, sending, typing and unread counts
//!
//! ## Serialization Format
//!
//! All DTOs use `serde_json` for JSON serialization:
//!
//! - **Field naming**: snake_case (default serde behavior)
//! - **Optional fields**: Omitted when `None` using `#[serde(skip_serializing_if = "Option::is_none")]`
//! - **Enums**: Serialize to snake_case strings using `#[serde(rename_all = "snake_case")]`
//! - **All types**: Implement both `Serialize` and `Deserialize`

pub mod messaging;

pub use messaging::*;
