//! # Roomline Messaging Core
//!
//! Real-time, bidirectional messaging subsystem connecting customers and
//! agents inside the Roomline property marketplace. This crate owns the live
//! per-peer conversation list, unread-count aggregation, message history
//! caching, ephemeral typing indicators, and the reconciliation between
//! asynchronously pushed channel events and request/response REST calls.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 messaging (this crate)                   │
//! ├──────────────────────────────────────────────────────────┤
//! │  session     - MessagingSession state machine            │
//! │  services    - REST client + event-channel subscriber    │
//! │  events      - AppEvent bus between tasks and session    │
//! │  Tokio       - Async runtime                             │
//! │  Reqwest     - HTTP client                               │
//! └──────────────────────────────────────────────────────────┘
//!          │ HTTP/JSON                    │ WebSocket
//!          ▼                              ▼
//! ┌─────────────────┐          ┌─────────────────────────┐
//! │  REST backend   │          │  Event channel           │
//! │  (collaborator) │          │  (private per-user)      │
//! └─────────────────┘          └─────────────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - **session**: The subsystem core. [`session::MessagingSession`] owns the
//!   shared [`session::state::SessionState`], spawns async tasks for every
//!   network operation, and applies their results through
//!   [`events::AppEvent`] handling. One file per concern: conversation
//!   directory, history cache, typing indicators, unread counts, composer,
//!   read receipts.
//! - **services**: External integrations. `services::api` is the reqwest
//!   REST client; `services::channel` subscribes to the per-user private
//!   event channels and feeds the event bus.
//! - **core**: Error type ([`core::error::AppError`]) and the
//!   [`core::service::MessagingApi`] trait used to inject either the real
//!   client or a test double into the session.
//!
//! ## Consistency model
//!
//! The server is the source of truth. Local state is a cache rebuilt by
//! wholesale refetch after every mutating or push-triggered event; stale
//! responses are detected with a selection sequence number and discarded.
//! See [`session::history`].

pub mod config;
pub mod core;
pub mod events;
pub mod services;
pub mod session;

pub use crate::config::Config;
pub use crate::core::error::{AppError, Result};
pub use crate::core::service::MessagingApi;
pub use crate::events::AppEvent;
pub use crate::session::MessagingSession;
