//! Messages routed by the Hub.

/// A message for every client of one game session.
///
/// `target` travels with the message but does not restrict delivery; the
/// sender receives its own broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastMessage {
    pub session_id: String,
    pub content: String,
    pub from_user: String,
    pub target: String,
}

impl BroadcastMessage {
    pub fn new(
        session_id: impl Into<String>,
        content: impl Into<String>,
        from_user: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            content: content.into(),
            from_user: from_user.into(),
            target: target.into(),
        }
    }
}

/// A message for exactly one user of one game session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateMessage {
    pub from_user: String,
    pub to_user: String,
    pub session_id: String,
    pub message: String,
}

impl PrivateMessage {
    pub fn new(
        from_user: impl Into<String>,
        to_user: impl Into<String>,
        session_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            from_user: from_user.into(),
            to_user: to_user.into(),
            session_id: session_id.into(),
            message: message.into(),
        }
    }
}
