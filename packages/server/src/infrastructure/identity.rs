//! Identity provider backed by request metadata.

use async_trait::async_trait;

use crate::domain::{IdentityError, IdentityProvider, IdentityRequest};

/// Header set by the authenticating proxy in front of the hub
pub const USER_HEADER: &str = "x-user-id";

/// Trusts the user id supplied with the upgrade request.
///
/// The header always wins. The `user_id` query parameter is only accepted
/// when `allow_query` is set, which is meant for local development and
/// tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrustedIdentityProvider {
    allow_query: bool,
}

impl TrustedIdentityProvider {
    pub fn new(allow_query: bool) -> Self {
        Self { allow_query }
    }
}

fn non_empty(value: String) -> Result<String, IdentityError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(IdentityError::Invalid("empty user id".to_string()))
    } else {
        Ok(trimmed.to_string())
    }
}

#[async_trait]
impl IdentityProvider for TrustedIdentityProvider {
    async fn identify(&self, request: IdentityRequest) -> Result<String, IdentityError> {
        if let Some(user) = request.user_header {
            return non_empty(user);
        }

        match request.query_user_id {
            Some(user) if self.allow_query => non_empty(user),
            _ => Err(IdentityError::Missing),
        }
    }
}
