//! Server execution logic.

use std::{future::Future, sync::Arc};

use axum::{Router, routing::get};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{
    config::ServerConfig,
    infrastructure::hub::{Hub, HubHandle},
    usecase::{ConnectClientUseCase, InspectHubUseCase},
};

use super::{
    handler::{get_session_clients, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Session hub server
///
/// Owns the Hub loop for its whole lifetime: the loop is started by
/// [`Server::serve`] and stopped when the shutdown future resolves.
///
/// # Example
///
/// ```ignore
/// let (hub, hub_handle) = Hub::new();
/// let server = Server::new(config, hub, hub_handle, connect_usecase, inspect_usecase);
/// server.run().await?;
/// ```
pub struct Server {
    config: ServerConfig,
    hub: Hub,
    hub_handle: HubHandle,
    /// ConnectClientUseCase（接続の認証と登録）
    connect_client_usecase: Arc<ConnectClientUseCase>,
    /// InspectHubUseCase（Hub の状態参照）
    inspect_hub_usecase: Arc<InspectHubUseCase>,
}

impl Server {
    pub fn new(
        config: ServerConfig,
        hub: Hub,
        hub_handle: HubHandle,
        connect_client_usecase: Arc<ConnectClientUseCase>,
        inspect_hub_usecase: Arc<InspectHubUseCase>,
    ) -> Self {
        Self {
            config,
            hub,
            hub_handle,
            connect_client_usecase,
            inspect_hub_usecase,
        }
    }

    pub fn router(&self) -> Router {
        let app_state = Arc::new(AppState {
            connect_client_usecase: self.connect_client_usecase.clone(),
            inspect_hub_usecase: self.inspect_hub_usecase.clone(),
        });

        Router::new()
            // WebSocket エンドポイント
            .route("/session/{session_id}/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/sessions/{session_id}/clients", get(get_session_clients))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Bind the configured address and serve until Ctrl+C or SIGTERM.
    pub async fn run(self) -> Result<(), ServerError> {
        let addr = self.config.bind_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;

        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on `listener` until `shutdown` resolves.
    ///
    /// On shutdown the Hub closes every client first, so upgraded
    /// connections end before the HTTP server finishes draining.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        let Server {
            hub, hub_handle, ..
        } = self;
        let hub_task = tokio::spawn(hub.run());

        if let Ok(addr) = listener.local_addr() {
            tracing::info!("Session hub listening on {}", addr);
            tracing::info!("Connect to: ws://{}/session/{{session_id}}/ws", addr);
        }
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        let stop_hub = hub_handle.clone();
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.await;
                tracing::info!("Shutting down, closing all clients");
                if stop_hub.shutdown().is_err() {
                    tracing::debug!("Hub already stopped");
                }
            })
            .await
            .map_err(ServerError::Serve);

        // serve may fail before the shutdown future ever ran
        let _ = hub_handle.shutdown();
        if let Err(e) = hub_task.await {
            tracing::error!("Hub loop failed: {}", e);
        }
        tracing::info!("Server shutdown complete");

        result
    }
}
