//! Connection actor error and exit types.

use thiserror::Error;

/// Transport failures; each one is fatal to its connection only
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    #[error("read deadline exceeded")]
    ReadTimeout,

    #[error("write deadline exceeded")]
    WriteTimeout,

    #[error("message of {size} bytes exceeds the {limit} byte limit")]
    MessageTooLarge { size: usize, limit: usize },

    #[error("transport error: {0}")]
    Transport(String),
}

/// Why the inbound loop stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundExit {
    /// The peer sent a close frame
    PeerClosed,
    /// The stream ended without a close frame
    StreamEnded,
    /// The Hub no longer accepts commands
    HubStopped,
    Failed(ConnectionError),
}

/// Why the outbound loop stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundExit {
    /// The Hub closed the outbound buffer
    BufferClosed,
    Failed(ConnectionError),
}

/// The loop whose exit started teardown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Teardown {
    Inbound(InboundExit),
    Outbound(OutboundExit),
    /// One of the loops panicked; the panic stayed inside its task
    Panicked,
}
