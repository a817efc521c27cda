//! # Core Abstractions
//!
//! Foundational pieces used throughout the messaging crate:
//!
//! - **[`error`]**: Application error types (`AppError`, `Result<T>`)
//! - **[`service`]**: The `MessagingApi` trait for dependency injection,
//!   implemented by the real REST client and by test doubles

pub mod error;
pub mod service;
