//! Error types for the CLI client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server refused the upgrade; retrying will not help
    #[error("Server rejected the connection with HTTP {0}")]
    Rejected(u16),

    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Gave up after the last reconnect attempt
    #[error("Failed to reconnect after {0} attempts")]
    ReconnectExhausted(u32),

    #[error("Invalid server URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Errors in a line typed by the user
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("usage: /to <user> <message> (missing user)")]
    MissingRecipient,

    #[error("usage: /to <user> <message> (missing message)")]
    MissingMessage,

    #[error("message is {size} bytes once encoded; the server accepts at most {limit}")]
    TooLong { size: usize, limit: usize },

    #[error("failed to encode message: {0}")]
    Encode(String),
}
