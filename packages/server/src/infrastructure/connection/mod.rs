//! Connection actor: one per physical WebSocket.
//!
//! ## Structure
//!
//! - `inbound`: reads frames, decodes them and forwards routing requests to the Hub
//! - `outbound`: drains the outbound buffer to the socket and sends keepalive pings
//!
//! The two loops run as separate tasks and share nothing but the Hub handle.
//! Whichever finishes first aborts the other; the actor then unregisters
//! from the Hub. Unregister is scoped to this connection's id, so teardown
//! can never remove a newer connection that reused the same key.

mod error;
mod inbound;
mod outbound;

use std::fmt::Display;

use axum::extract::ws::Message;
use futures_util::{Sink, Stream};
use tokio::sync::mpsc;

use crate::{
    config::ConnectionSettings,
    domain::{ClientKey, ClientState, ConnectionId},
    infrastructure::hub::{ClientHandle, HubError, HubHandle},
};

pub use error::{ConnectionError, InboundExit, OutboundExit, Teardown};

/// Result of a finished connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Closed {
    pub teardown: Teardown,
    pub state: ClientState,
}

pub struct Connection {
    key: ClientKey,
    connection_id: ConnectionId,
    hub: HubHandle,
    settings: ConnectionSettings,
    state: ClientState,
}

impl Connection {
    pub fn new(key: ClientKey, hub: HubHandle, settings: ConnectionSettings) -> Self {
        Self {
            key,
            connection_id: ConnectionId::generate(),
            hub,
            settings,
            state: ClientState::Connecting,
        }
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    pub fn state(&self) -> ClientState {
        self.state
    }

    fn advance(&mut self, next: ClientState) {
        match self.state.transition(next) {
            Ok(state) => {
                tracing::debug!(client = %self.key, state = ?state, "Client state changed");
                self.state = state;
            }
            Err(e) => tracing::error!(client = %self.key, "{}", e),
        }
    }

    /// Create the outbound buffer and hand its sending half to the Hub.
    ///
    /// The returned receiver is the buffer the outbound loop drains.
    pub fn register(&mut self, connected_at: i64) -> Result<mpsc::Receiver<String>, HubError> {
        let (tx, rx) = mpsc::channel(self.settings.outbound_capacity());
        self.hub.register(ClientHandle::new(
            self.key.clone(),
            self.connection_id,
            connected_at,
            tx,
        ))?;
        self.advance(ClientState::Registered);
        Ok(rx)
    }

    /// Run both loops until one of them finishes, then tear down.
    pub async fn run<K, S, E>(
        mut self,
        sink: K,
        stream: S,
        outbound: mpsc::Receiver<String>,
    ) -> Closed
    where
        K: Sink<Message> + Unpin + Send + 'static,
        K::Error: Display + Send,
        S: Stream<Item = Result<Message, E>> + Unpin + Send + 'static,
        E: Display + Send + 'static,
    {
        let mut recv_task = tokio::spawn(inbound::receive_loop(
            stream,
            self.key.clone(),
            self.hub.clone(),
            self.settings.clone(),
        ));
        let mut send_task = tokio::spawn(outbound::send_loop(
            sink,
            outbound,
            self.settings.clone(),
        ));
        self.advance(ClientState::Active);
        tracing::info!(client = %self.key, connection_id = %self.connection_id, "Connection active");

        // If any one of the tasks completes, abort the other
        let teardown = tokio::select! {
            result = &mut recv_task => {
                send_task.abort();
                match result {
                    Ok(exit) => Teardown::Inbound(exit),
                    Err(e) => {
                        tracing::error!(client = %self.key, "Inbound loop failed: {}", e);
                        Teardown::Panicked
                    }
                }
            }
            result = &mut send_task => {
                recv_task.abort();
                match result {
                    Ok(exit) => Teardown::Outbound(exit),
                    Err(e) => {
                        tracing::error!(client = %self.key, "Outbound loop failed: {}", e);
                        Teardown::Panicked
                    }
                }
            }
        };
        self.advance(ClientState::Closing);
        tracing::info!(client = %self.key, teardown = ?teardown, "Closing connection");

        if self
            .hub
            .unregister_and_wait(self.key.clone(), self.connection_id)
            .await
            .is_err()
        {
            tracing::debug!(client = %self.key, "Hub already stopped");
        }
        self.advance(ClientState::Unregistered);

        Closed {
            teardown,
            state: self.state,
        }
    }
}
