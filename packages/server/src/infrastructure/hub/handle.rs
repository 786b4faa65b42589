//! Handles used to talk to the Hub loop.

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use crate::domain::{BroadcastMessage, ClientKey, ConnectionId, PrivateMessage};

/// The Hub loop has stopped and no longer accepts commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("hub is not running")]
pub struct HubError;

/// Registry entry: the sending half of a client's outbound buffer plus
/// the metadata needed for routing.
///
/// The Hub is the only holder of the sender, so dropping the entry closes
/// the buffer.
#[derive(Debug)]
pub struct ClientHandle {
    pub(super) key: ClientKey,
    pub(super) connection_id: ConnectionId,
    pub(super) connected_at: i64,
    pub(super) outbound: mpsc::Sender<String>,
}

impl ClientHandle {
    pub fn new(
        key: ClientKey,
        connection_id: ConnectionId,
        connected_at: i64,
        outbound: mpsc::Sender<String>,
    ) -> Self {
        Self {
            key,
            connection_id,
            connected_at,
            outbound,
        }
    }

    pub fn key(&self) -> &ClientKey {
        &self.key
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }
}

/// Read-only view of a registered client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSummary {
    pub key: ClientKey,
    /// UTC milliseconds
    pub connected_at: i64,
}

/// Commands processed by the Hub loop, strictly in arrival order
#[derive(Debug)]
pub enum HubCommand {
    Register(ClientHandle),
    Unregister {
        key: ClientKey,
        connection_id: ConnectionId,
        ack: oneshot::Sender<()>,
    },
    Broadcast(BroadcastMessage),
    Private(PrivateMessage),
    Snapshot {
        session_id: Option<String>,
        reply: oneshot::Sender<Vec<ClientSummary>>,
    },
    Shutdown,
}

/// Cheap, cloneable sender side of the Hub.
///
/// Every method only enqueues a command; none of them waits for a client.
#[derive(Debug, Clone)]
pub struct HubHandle {
    commands: mpsc::UnboundedSender<HubCommand>,
}

impl HubHandle {
    pub(super) fn new(commands: mpsc::UnboundedSender<HubCommand>) -> Self {
        Self { commands }
    }

    /// Handle whose commands land in the returned receiver instead of a Hub
    #[cfg(test)]
    pub(crate) fn detached() -> (Self, mpsc::UnboundedReceiver<HubCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    fn send(&self, command: HubCommand) -> Result<(), HubError> {
        self.commands.send(command).map_err(|_| HubError)
    }

    pub fn register(&self, client: ClientHandle) -> Result<(), HubError> {
        self.send(HubCommand::Register(client))
    }

    /// Unregister and wait until the Hub has processed the request.
    pub async fn unregister_and_wait(
        &self,
        key: ClientKey,
        connection_id: ConnectionId,
    ) -> Result<(), HubError> {
        let (ack, done) = oneshot::channel();
        self.send(HubCommand::Unregister {
            key,
            connection_id,
            ack,
        })?;
        done.await.map_err(|_| HubError)
    }

    pub fn broadcast(&self, msg: BroadcastMessage) -> Result<(), HubError> {
        self.send(HubCommand::Broadcast(msg))
    }

    pub fn send_private(&self, msg: PrivateMessage) -> Result<(), HubError> {
        self.send(HubCommand::Private(msg))
    }

    /// Registered clients, optionally limited to one session, sorted by key.
    pub async fn snapshot(&self, session_id: Option<String>) -> Result<Vec<ClientSummary>, HubError> {
        let (reply, response) = oneshot::channel();
        self.send(HubCommand::Snapshot { session_id, reply })?;
        response.await.map_err(|_| HubError)
    }

    /// Close every client and stop the loop.
    pub fn shutdown(&self) -> Result<(), HubError> {
        self.send(HubCommand::Shutdown)
    }
}
