//! Use case error types.

use thiserror::Error;

use crate::{
    domain::{ClientKeyError, IdentityError},
    infrastructure::hub::HubError,
};

/// Errors raised while bootstrapping a connection
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error("unauthenticated: {0}")]
    Unauthenticated(#[from] IdentityError),

    #[error("invalid client key: {0}")]
    InvalidClientKey(#[from] ClientKeyError),

    #[error("hub unavailable")]
    HubUnavailable(#[from] HubError),
}
