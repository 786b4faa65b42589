//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

/// `GET /api/health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthDto {
    pub status: String,
    /// Number of clients currently registered with the hub
    pub clients: usize,
}

/// One entry of `GET /api/sessions/{session_id}/clients`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedClientDto {
    pub user_id: String,
    pub session_id: String,
    /// RFC 3339 timestamp of the handshake
    pub connected_at: String,
}
