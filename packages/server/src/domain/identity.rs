//! Identity provider trait.
//!
//! The hub trusts the user id returned here and performs no further
//! authorization. Implementations live in the infrastructure layer.

use async_trait::async_trait;

use super::IdentityError;

/// Identity material extracted from an upgrade request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityRequest {
    /// Value of the trusted user header set by the authenticating proxy
    pub user_header: Option<String>,
    /// `user_id` query parameter, only honoured by providers that allow it
    pub query_user_id: Option<String>,
}

/// Resolves the authenticated user behind a connection request
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Return the user id of the request, or why there is none
    async fn identify(&self, request: IdentityRequest) -> Result<String, IdentityError>;
}
