//! Domain layer: identities, routed messages and the client lifecycle.
//!
//! This layer has no knowledge of WebSocket, JSON or the Hub's channels.

mod client_key;
mod error;
mod identity;
mod lifecycle;
mod message;

pub use client_key::{ClientKey, ConnectionId};
pub use error::{ClientKeyError, IdentityError, StateTransitionError};
pub use identity::{IdentityProvider, IdentityRequest};
pub use lifecycle::ClientState;
pub use message::{BroadcastMessage, PrivateMessage};

#[cfg(test)]
pub use identity::MockIdentityProvider;
