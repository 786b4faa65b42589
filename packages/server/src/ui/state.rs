//! Shared application state.

use std::sync::Arc;

use crate::usecase::{ConnectClientUseCase, InspectHubUseCase};

/// State shared by every handler
pub struct AppState {
    /// ConnectClientUseCase（接続の認証と登録）
    pub connect_client_usecase: Arc<ConnectClientUseCase>,
    /// InspectHubUseCase（Hub の状態参照）
    pub inspect_hub_usecase: Arc<InspectHubUseCase>,
}
