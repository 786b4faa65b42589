//! Inbound loop: peer -> Hub.

use std::fmt::Display;

use axum::extract::ws::Message;
use futures_util::{Stream, StreamExt};
use tokio::time::timeout;

use crate::{
    config::ConnectionSettings,
    domain::{BroadcastMessage, ClientKey, PrivateMessage},
    infrastructure::{
        dto::websocket::{InboundMessage, decode_inbound},
        hub::{HubError, HubHandle},
    },
};

use super::error::{ConnectionError, InboundExit};

/// Read frames until the peer leaves, the transport fails or the read
/// deadline passes.
///
/// The deadline restarts with every received frame, pongs included.
/// Undecodable frames are logged and dropped.
pub(super) async fn receive_loop<S, E>(
    mut stream: S,
    key: ClientKey,
    hub: HubHandle,
    settings: ConnectionSettings,
) -> InboundExit
where
    S: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    loop {
        let message = match timeout(settings.read_deadline(), stream.next()).await {
            Err(_) => return InboundExit::Failed(ConnectionError::ReadTimeout),
            Ok(None) => return InboundExit::StreamEnded,
            Ok(Some(Err(e))) => {
                return InboundExit::Failed(ConnectionError::Transport(e.to_string()));
            }
            Ok(Some(Ok(message))) => message,
        };

        let outcome = match message {
            Message::Text(text) => handle_frame(text.as_str(), &key, &hub, &settings),
            Message::Binary(data) => match std::str::from_utf8(&data) {
                Ok(text) => handle_frame(text, &key, &hub, &settings),
                Err(_) => {
                    tracing::warn!(client = %key, "Dropping non UTF-8 binary frame");
                    Ok(())
                }
            },
            Message::Pong(_) => {
                tracing::trace!(client = %key, "Received pong");
                Ok(())
            }
            // Answered by the transport
            Message::Ping(_) => Ok(()),
            Message::Close(frame) => {
                tracing::info!(client = %key, reason = ?frame, "Client requested close");
                return InboundExit::PeerClosed;
            }
        };

        if let Err(exit) = outcome {
            return exit;
        }
    }
}

fn handle_frame(
    raw: &str,
    key: &ClientKey,
    hub: &HubHandle,
    settings: &ConnectionSettings,
) -> Result<(), InboundExit> {
    if raw.len() > settings.max_message_size() {
        return Err(InboundExit::Failed(ConnectionError::MessageTooLarge {
            size: raw.len(),
            limit: settings.max_message_size(),
        }));
    }

    dispatch(raw, key, hub).map_err(|_| InboundExit::HubStopped)
}

fn dispatch(raw: &str, key: &ClientKey, hub: &HubHandle) -> Result<(), HubError> {
    match decode_inbound(raw) {
        Ok(InboundMessage::Broadcast(payload)) => hub.broadcast(BroadcastMessage::new(
            key.session_id(),
            payload.message,
            key.user_id(),
            payload.target,
        )),
        Ok(InboundMessage::Private(payload)) => hub.send_private(PrivateMessage::new(
            key.user_id(),
            payload.target,
            key.session_id(),
            payload.message,
        )),
        Ok(InboundMessage::Unknown(content_type)) => {
            tracing::debug!(client = %key, %content_type, "Ignoring unknown content type");
            Ok(())
        }
        Err(e) => {
            tracing::warn!(client = %key, "Dropping frame: {}", e);
            Ok(())
        }
    }
}
