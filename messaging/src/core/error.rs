//! # Common Error Types
//!
//! Consolidated error handling for the messaging core.
//!
//! Errors are categorized by their source:
//!
//! - **Api**: REST backend communication errors (network, HTTP status, JSON parsing)
//! - **Channel**: Event-channel transport errors (connect, subscribe, malformed frames)
//! - **State**: Session state errors (invalid selection, operation rejected)
//! - **Validation**: Input validation errors (empty message, unknown peer)

use thiserror::Error;

/// Application-wide error type for the messaging subsystem.
///
/// Each variant carries a descriptive message. The API layer itself returns
/// `Result<_, String>`; strings are converted into `AppError::Api` at the
/// session boundary.
#[derive(Debug, Error)]
pub enum AppError {
    /// REST backend communication failure: network errors, non-success HTTP
    /// status codes, or malformed JSON responses.
    #[error("API error: {0}")]
    Api(String),

    /// Event-channel transport failure: connection, subscription, or frame
    /// parsing problems.
    #[error("Channel error: {0}")]
    Channel(String),

    /// Session state failure, e.g. an operation that requires a selected
    /// conversation when none is selected, or a send while another send is
    /// already in flight.
    #[error("State error: {0}")]
    State(String),

    /// User input validation failure, e.g. an empty message body.
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Convenience type alias for `Result<T, AppError>`.
pub type Result<T> = std::result::Result<T, AppError>;

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Api(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Api(msg.to_string())
    }
}
