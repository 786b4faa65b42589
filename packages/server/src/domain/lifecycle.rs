//! Connection actor lifecycle.

use super::StateTransitionError;

/// Lifecycle of one connection actor.
///
/// `Connecting -> Registered -> Active -> Closing -> Unregistered`.
/// Every transition advances exactly one step; `Unregistered` is terminal.
/// A reconnect with the same identity starts a new actor at `Connecting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    Connecting,
    Registered,
    Active,
    Closing,
    Unregistered,
}

impl ClientState {
    fn successor(self) -> Option<ClientState> {
        match self {
            ClientState::Connecting => Some(ClientState::Registered),
            ClientState::Registered => Some(ClientState::Active),
            ClientState::Active => Some(ClientState::Closing),
            ClientState::Closing => Some(ClientState::Unregistered),
            ClientState::Unregistered => None,
        }
    }

    /// Move to `next` if it directly follows the current state.
    pub fn transition(self, next: ClientState) -> Result<ClientState, StateTransitionError> {
        if self.successor() == Some(next) {
            Ok(next)
        } else {
            Err(StateTransitionError {
                from: self,
                to: next,
            })
        }
    }
}
