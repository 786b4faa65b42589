//! Parsing of user input lines into outgoing frames.

use traveller_server::{
    config::DEFAULT_MAX_MESSAGE_SIZE,
    infrastructure::dto::websocket::{
        BROADCAST_MESSAGE_TAG, ClientPayload, PRIVATE_MESSAGE_TAG, encode_inbound,
    },
};

use crate::error::CommandError;

const PRIVATE_PREFIX: &str = "/to";

/// Largest frame the hub accepts; anything bigger closes the connection
pub const MAX_FRAME_SIZE: usize = DEFAULT_MAX_MESSAGE_SIZE;

/// A line typed by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Plain text, sent to everyone in the session
    Broadcast(String),
    /// `/to <user> <message>`
    Private { to_user: String, message: String },
}

impl Command {
    /// Parse one input line.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();

        let Some(rest) = line.strip_prefix(PRIVATE_PREFIX) else {
            return Ok(Command::Broadcast(line.to_string()));
        };
        // "/today" is an ordinary message
        if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
            return Ok(Command::Broadcast(line.to_string()));
        }

        let rest = rest.trim_start();
        if rest.is_empty() {
            return Err(CommandError::MissingRecipient);
        }
        let (to_user, message) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
        let message = message.trim();
        if message.is_empty() {
            return Err(CommandError::MissingMessage);
        }

        Ok(Command::Private {
            to_user: to_user.to_string(),
            message: message.to_string(),
        })
    }

    /// Encode as the JSON frame the hub expects.
    ///
    /// Frames over [`MAX_FRAME_SIZE`] are refused here instead of being
    /// sent and costing the connection.
    pub fn to_frame(&self) -> Result<String, CommandError> {
        let frame = self
            .encode()
            .map_err(|e| CommandError::Encode(e.to_string()))?;
        if frame.len() > MAX_FRAME_SIZE {
            return Err(CommandError::TooLong {
                size: frame.len(),
                limit: MAX_FRAME_SIZE,
            });
        }
        Ok(frame)
    }

    fn encode(&self) -> serde_json::Result<String> {
        match self {
            Command::Broadcast(message) => encode_inbound(
                BROADCAST_MESSAGE_TAG,
                &ClientPayload {
                    message: message.clone(),
                    target: String::new(),
                },
            ),
            Command::Private { to_user, message } => encode_inbound(
                PRIVATE_MESSAGE_TAG,
                &ClientPayload {
                    message: message.clone(),
                    target: to_user.clone(),
                },
            ),
        }
    }
}
