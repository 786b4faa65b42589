//! UseCase: read-only views of the Hub registry.

use crate::infrastructure::hub::{ClientSummary, HubError, HubHandle};

pub struct InspectHubUseCase {
    hub: HubHandle,
}

impl InspectHubUseCase {
    pub fn new(hub: HubHandle) -> Self {
        Self { hub }
    }

    /// Number of registered clients across all sessions
    pub async fn count(&self) -> Result<usize, HubError> {
        Ok(self.hub.snapshot(None).await?.len())
    }

    /// Registered clients of one session, sorted by user id
    pub async fn clients_in(&self, session_id: &str) -> Result<Vec<ClientSummary>, HubError> {
        self.hub.snapshot(Some(session_id.to_string())).await
    }
}
