//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    infrastructure::dto::http::{ConnectedClientDto, HealthDto},
    ui::state::AppState,
};

/// Health check endpoint
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> Result<Json<HealthDto>, StatusCode> {
    let clients = state.inspect_hub_usecase.count().await.map_err(|e| {
        tracing::error!("Health check failed: {}", e);
        StatusCode::SERVICE_UNAVAILABLE
    })?;

    Ok(Json(HealthDto {
        status: "ok".to_string(),
        clients,
    }))
}

/// Clients currently connected to one session
pub async fn get_session_clients(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<Vec<ConnectedClientDto>>, StatusCode> {
    let clients = state
        .inspect_hub_usecase
        .clients_in(&session_id)
        .await
        .map_err(|e| {
            tracing::error!(session = %session_id, "Failed to list clients: {}", e);
            StatusCode::SERVICE_UNAVAILABLE
        })?;

    // Domain Model から DTO への変換
    Ok(Json(clients.iter().map(ConnectedClientDto::from).collect()))
}
