//! Client identity within the Hub registry.

use std::fmt;

use uuid::Uuid;

use super::ClientKeyError;

/// Composite identity `(user_id, session_id)` of a live connection.
///
/// Displayed as `user_id:session_id`. The registry is keyed by the struct
/// itself, so ids containing `:` cannot collide with each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientKey {
    user_id: String,
    session_id: String,
}

impl ClientKey {
    pub fn new(
        user_id: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Result<Self, ClientKeyError> {
        let user_id = user_id.into();
        let session_id = session_id.into();

        if user_id.trim().is_empty() {
            return Err(ClientKeyError::EmptyUserId);
        }
        if session_id.trim().is_empty() {
            return Err(ClientKeyError::EmptySessionId);
        }

        Ok(Self {
            user_id,
            session_id,
        })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

impl fmt::Display for ClientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.user_id, self.session_id)
    }
}

/// Identifies one physical connection.
///
/// Two actors may share a [`ClientKey`] for a short time after a reconnect;
/// the connection id tells their registrations apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
