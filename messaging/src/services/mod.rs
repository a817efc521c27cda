//! # Services Module
//!
//! External integrations for the messaging core.
//!
//! ```text
//! services/
//! ├── api/        - Backend REST client
//! │                 (peers, history, send, read ack, typing, unread counts)
//! └── channel.rs  - Event-channel subscriber
//!                   (private per-user channels over WebSocket)
//! ```

pub mod api;
pub mod channel;
