//! Domain error types.

use thiserror::Error;

use super::ClientState;

/// Errors raised while building a [`ClientKey`](super::ClientKey)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientKeyError {
    #[error("user id must not be empty")]
    EmptyUserId,

    #[error("session id must not be empty")]
    EmptySessionId,
}

/// An attempted lifecycle transition that skips or re-enters a state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid client state transition: {from:?} -> {to:?}")]
pub struct StateTransitionError {
    pub from: ClientState,
    pub to: ClientState,
}

/// Errors returned by an [`IdentityProvider`](super::IdentityProvider)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// No identity was presented with the request
    #[error("no authenticated identity on the request")]
    Missing,

    /// An identity was presented but is unusable
    #[error("invalid identity: {0}")]
    Invalid(String),
}
