//! WebSocket frame codec.
//!
//! Inbound frames are `{"contentType": tag, "payload": {...}}`. The tag is
//! read first and the payload is then decoded straight into the variant's
//! type. Outbound frames are flat objects tagged by `contentType`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Inbound tag for session-wide messages
pub const BROADCAST_MESSAGE_TAG: &str = "BroadcastMessage";
/// Inbound and outbound tag for user-targeted messages
pub const PRIVATE_MESSAGE_TAG: &str = "PrivateMessage";

/// Why an inbound frame could not be decoded
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The frame is not a JSON envelope with a string `contentType`
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(#[source] serde_json::Error),

    /// The payload does not match the shape of its content type
    #[error("invalid {content_type} payload: {source}")]
    InvalidPayload {
        content_type: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "contentType")]
    content_type: String,
    #[serde(default)]
    payload: serde_json::Value,
}

/// Payload carried by both inbound message kinds.
///
/// Field names are case-sensitive; unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientPayload {
    #[serde(rename = "Message")]
    pub message: String,
    #[serde(rename = "Target")]
    pub target: String,
}

/// A decoded inbound frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage {
    Broadcast(ClientPayload),
    Private(ClientPayload),
    /// A tag this hub does not know; ignored by the receiver
    Unknown(String),
}

/// Normalize a raw inbound frame: newlines become spaces, outer whitespace
/// is trimmed.
pub fn normalize_frame(raw: &str) -> String {
    raw.replace(['\r', '\n'], " ").trim().to_string()
}

/// Decode an inbound frame.
pub fn decode_inbound(raw: &str) -> Result<InboundMessage, DecodeError> {
    let frame = normalize_frame(raw);
    let envelope: Envelope =
        serde_json::from_str(&frame).map_err(DecodeError::MalformedEnvelope)?;

    let decode_payload = |payload: serde_json::Value| {
        serde_json::from_value::<ClientPayload>(payload).map_err(|source| {
            DecodeError::InvalidPayload {
                content_type: envelope.content_type.clone(),
                source,
            }
        })
    };

    match envelope.content_type.as_str() {
        BROADCAST_MESSAGE_TAG => Ok(InboundMessage::Broadcast(decode_payload(
            envelope.payload.clone(),
        )?)),
        PRIVATE_MESSAGE_TAG => Ok(InboundMessage::Private(decode_payload(
            envelope.payload.clone(),
        )?)),
        other => Ok(InboundMessage::Unknown(other.to_string())),
    }
}

/// Encode an inbound frame the way peers send it.
pub fn encode_inbound(content_type: &str, payload: &ClientPayload) -> serde_json::Result<String> {
    serde_json::to_string(&serde_json::json!({
        "contentType": content_type,
        "payload": payload,
    }))
}

/// A frame written to a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "contentType")]
pub enum OutboundFrame {
    /// Tagged `BoradcastMessage`, the spelling existing peers expect; it
    /// differs from the inbound tag.
    #[serde(rename = "BoradcastMessage", rename_all = "camelCase")]
    Broadcast {
        session_id: String,
        content: String,
        from_user: String,
        target: String,
    },
    #[serde(rename = "PrivateMessage", rename_all = "camelCase")]
    Private {
        message: String,
        session_id: String,
        to_user: String,
        from_user: String,
    },
}

impl OutboundFrame {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}
