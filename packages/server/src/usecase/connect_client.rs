//! UseCase: connection bootstrap
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectClientUseCase::authenticate() による ClientKey の組み立て
//! - ConnectClientUseCase::execute() による登録から切断までの流れ
//!
//! ### どのような状況を想定しているか
//! - 正常系：認証済みユーザーの接続と Hub への登録
//! - 異常系：認証情報なし、空のセッション ID
//! - エッジケース：Hub 停止による強制切断

use std::{fmt::Display, sync::Arc};

use axum::extract::ws::Message;
use futures_util::{Sink, Stream};
use traveller_shared::time::Clock;

use crate::{
    config::ConnectionSettings,
    domain::{ClientKey, IdentityProvider, IdentityRequest},
    infrastructure::{
        connection::{Closed, Connection},
        hub::HubHandle,
    },
};

use super::error::ConnectError;

/// Turns an authenticated, upgraded connection into a registered actor
pub struct ConnectClientUseCase {
    hub: HubHandle,
    identity: Arc<dyn IdentityProvider>,
    clock: Arc<dyn Clock>,
    settings: ConnectionSettings,
}

impl ConnectClientUseCase {
    pub fn new(
        hub: HubHandle,
        identity: Arc<dyn IdentityProvider>,
        clock: Arc<dyn Clock>,
        settings: ConnectionSettings,
    ) -> Self {
        Self {
            hub,
            identity,
            clock,
            settings,
        }
    }

    pub fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    /// Resolve the user behind `request` and build its key for `session_id`.
    ///
    /// Runs before the upgrade so failures can still be answered over HTTP.
    pub async fn authenticate(
        &self,
        request: IdentityRequest,
        session_id: &str,
    ) -> Result<ClientKey, ConnectError> {
        let user_id = self.identity.identify(request).await?;
        Ok(ClientKey::new(user_id, session_id)?)
    }

    /// Register a connection actor for `key` and run it until teardown.
    pub async fn execute<K, S, E>(
        &self,
        key: ClientKey,
        sink: K,
        stream: S,
    ) -> Result<Closed, ConnectError>
    where
        K: Sink<Message> + Unpin + Send + 'static,
        K::Error: Display + Send,
        S: Stream<Item = Result<Message, E>> + Unpin + Send + 'static,
        E: Display + Send + 'static,
    {
        let mut connection = Connection::new(key, self.hub.clone(), self.settings.clone());
        let outbound = connection.register(self.clock.now_millis())?;

        Ok(connection.run(sink, stream, outbound).await)
    }
}
