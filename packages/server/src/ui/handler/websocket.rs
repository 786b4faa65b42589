//! WebSocket upgrade handler.

use std::sync::Arc;

use axum::{
    extract::{
        Path, Query, State,
        ws::{WebSocket, WebSocketUpgrade},
    },
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use futures_util::StreamExt;
use serde::Deserialize;

use crate::{
    domain::{ClientKey, IdentityRequest},
    infrastructure::identity::USER_HEADER,
    ui::state::AppState,
    usecase::{ConnectClientUseCase, ConnectError},
};

/// Query parameters for the WebSocket upgrade
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub user_id: Option<String>,
}

/// `GET /session/{session_id}/ws`
///
/// Identity is resolved before the upgrade: an unauthenticated request gets
/// `401` and an unusable key gets `400`, and neither ever reaches the Hub.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Query(query): Query<ConnectQuery>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, StatusCode> {
    let request = IdentityRequest {
        user_header: headers
            .get(USER_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
        query_user_id: query.user_id,
    };

    let usecase = state.connect_client_usecase.clone();
    let key = match usecase.authenticate(request, &session_id).await {
        Ok(key) => key,
        Err(ConnectError::Unauthenticated(e)) => {
            tracing::warn!(session = %session_id, "Rejected upgrade: {}", e);
            return Err(StatusCode::UNAUTHORIZED);
        }
        Err(e) => {
            tracing::warn!(session = %session_id, "Rejected upgrade: {}", e);
            return Err(StatusCode::BAD_REQUEST);
        }
    };

    let limit = usecase.settings().max_message_size();
    tracing::info!(client = %key, "Upgrading connection");
    Ok(ws
        .max_message_size(limit)
        .max_frame_size(limit)
        .on_upgrade(move |socket| handle_socket(socket, usecase, key)))
}

async fn handle_socket(socket: WebSocket, usecase: Arc<ConnectClientUseCase>, key: ClientKey) {
    let (sink, stream) = socket.split();

    match usecase.execute(key.clone(), sink, stream).await {
        Ok(closed) => {
            tracing::info!(client = %key, teardown = ?closed.teardown, "Client disconnected");
        }
        Err(e) => tracing::warn!(client = %key, "Failed to start connection: {}", e),
    }
}
