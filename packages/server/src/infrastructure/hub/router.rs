//! The Hub event loop.

use std::{collections::HashMap, ops::ControlFlow};

use tokio::sync::mpsc::{self, error::TrySendError};

use crate::{
    domain::{BroadcastMessage, ClientKey, ConnectionId, PrivateMessage},
    infrastructure::dto::websocket::OutboundFrame,
};

use super::handle::{ClientHandle, ClientSummary, HubCommand, HubHandle};

/// Outcome of a non-blocking enqueue onto an outbound buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delivery {
    Queued,
    /// Buffer full: the client is not keeping up
    Overflow,
    /// The actor already dropped its receiver
    Gone,
}

fn deliver(client: &ClientHandle, frame: &str) -> Delivery {
    match client.outbound.try_send(frame.to_string()) {
        Ok(()) => Delivery::Queued,
        Err(TrySendError::Full(_)) => Delivery::Overflow,
        Err(TrySendError::Closed(_)) => Delivery::Gone,
    }
}

/// Router owning the client registry.
///
/// Create with [`Hub::new`], spawn [`Hub::run`] and talk to it through the
/// returned [`HubHandle`].
pub struct Hub {
    clients: HashMap<ClientKey, ClientHandle>,
    commands: mpsc::UnboundedReceiver<HubCommand>,
}

impl Hub {
    pub fn new() -> (Self, HubHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let hub = Self {
            clients: HashMap::new(),
            commands: rx,
        };
        (hub, HubHandle::new(tx))
    }

    /// Process commands until shutdown or until every handle is dropped.
    pub async fn run(mut self) {
        tracing::info!("Hub started");

        while let Some(command) = self.commands.recv().await {
            if self.handle(command).is_break() {
                break;
            }
        }

        self.close_all();
        tracing::info!("Hub stopped");
    }

    fn handle(&mut self, command: HubCommand) -> ControlFlow<()> {
        match command {
            HubCommand::Register(client) => self.register(client),
            HubCommand::Unregister {
                key,
                connection_id,
                ack,
            } => {
                self.unregister(&key, connection_id);
                // The actor may have given up waiting
                let _ = ack.send(());
            }
            HubCommand::Broadcast(msg) => {
                self.route_broadcast(&msg);
            }
            HubCommand::Private(msg) => {
                self.route_private(&msg);
            }
            HubCommand::Snapshot { session_id, reply } => {
                let _ = reply.send(self.snapshot(session_id.as_deref()));
            }
            HubCommand::Shutdown => return ControlFlow::Break(()),
        }

        ControlFlow::Continue(())
    }

    fn register(&mut self, client: ClientHandle) {
        let key = client.key.clone();
        let connection_id = client.connection_id;

        // Replacing the entry drops the previous sender, which closes the
        // old actor's buffer.
        match self.clients.insert(key.clone(), client) {
            Some(previous) => tracing::info!(
                client = %key,
                connection_id = %connection_id,
                replaced = %previous.connection_id,
                "Re-registered client, previous connection closed"
            ),
            None => tracing::info!(
                client = %key,
                connection_id = %connection_id,
                "Registered client"
            ),
        }
    }

    /// Remove `key` if it still belongs to `connection_id`.
    ///
    /// Returns whether an entry was removed.
    fn unregister(&mut self, key: &ClientKey, connection_id: ConnectionId) -> bool {
        match self.clients.get(key) {
            Some(client) if client.connection_id == connection_id => {
                self.clients.remove(key);
                tracing::info!(client = %key, connection_id = %connection_id, "Unregistered client");
                true
            }
            Some(_) => {
                tracing::debug!(
                    client = %key,
                    connection_id = %connection_id,
                    "Ignoring unregister from a replaced connection"
                );
                false
            }
            None => {
                tracing::debug!(client = %key, "Client already unregistered");
                false
            }
        }
    }

    /// Returns the number of clients the frame was queued for.
    fn route_broadcast(&mut self, msg: &BroadcastMessage) -> usize {
        let frame = match OutboundFrame::from(msg).to_json() {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!("Failed to encode broadcast message: {}", e);
                return 0;
            }
        };

        let mut queued = 0;
        let mut evicted = Vec::new();
        for (key, client) in self
            .clients
            .iter()
            .filter(|(key, _)| key.session_id() == msg.session_id)
        {
            match deliver(client, &frame) {
                Delivery::Queued => queued += 1,
                outcome => evicted.push((key.clone(), outcome)),
            }
        }

        for (key, outcome) in evicted {
            self.evict(&key, outcome);
        }

        tracing::debug!(
            session_id = %msg.session_id,
            from_user = %msg.from_user,
            recipients = queued,
            "Routed broadcast"
        );
        queued
    }

    /// Returns whether the frame was queued for the recipient.
    fn route_private(&mut self, msg: &PrivateMessage) -> bool {
        let key = match ClientKey::new(msg.to_user.clone(), msg.session_id.clone()) {
            Ok(key) => key,
            Err(e) => {
                tracing::debug!(to_user = %msg.to_user, "Dropping private message: {}", e);
                return false;
            }
        };

        let Some(client) = self.clients.get(&key) else {
            tracing::debug!(client = %key, "Dropping private message for absent client");
            return false;
        };

        let frame = match OutboundFrame::from(msg).to_json() {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!("Failed to encode private message: {}", e);
                return false;
            }
        };

        match deliver(client, &frame) {
            Delivery::Queued => {
                tracing::debug!(client = %key, from_user = %msg.from_user, "Routed private message");
                true
            }
            outcome => {
                self.evict(&key, outcome);
                false
            }
        }
    }

    fn evict(&mut self, key: &ClientKey, outcome: Delivery) {
        if self.clients.remove(key).is_some() {
            match outcome {
                Delivery::Overflow => {
                    tracing::warn!(client = %key, "Outbound buffer full, disconnecting client")
                }
                _ => tracing::debug!(client = %key, "Removing client with closed buffer"),
            }
        }
    }

    fn snapshot(&self, session_id: Option<&str>) -> Vec<ClientSummary> {
        let mut clients: Vec<ClientSummary> = self
            .clients
            .values()
            .filter(|client| session_id.is_none_or(|id| client.key.session_id() == id))
            .map(|client| ClientSummary {
                key: client.key.clone(),
                connected_at: client.connected_at,
            })
            .collect();
        clients.sort_by(|a, b| a.key.cmp(&b.key));
        clients
    }

    fn close_all(&mut self) {
        let count = self.clients.len();
        self.clients.clear();
        if count > 0 {
            tracing::info!(clients = count, "Closed all client buffers");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::hub::OUTBOUND_BUFFER_CAPACITY;
    use tokio::sync::mpsc::error::TryRecvError;

    // ========================================
    // 【何をテストするか】
    // - Hub のレジストリ操作（register / unregister / 置き換え）
    // - ブロードキャストと個別メッセージのルーティング
    // - バッファ溢れ時の強制切断
    //
    // 【どのようなシナリオをテストするか】
    // 1. 同一セッションのみへのブロードキャスト（送信者を含む）
    // 2. 個別メッセージは宛先のみに届き、不在なら黙って破棄される
    // 3. バッファが満杯のクライアントは同じルーティング中に削除される
    // 4. 重複した unregister は一度だけ削除する
    // ========================================

    fn test_hub() -> Hub {
        let (hub, _handle) = Hub::new();
        hub
    }

    fn test_client(
        user: &str,
        session: &str,
        capacity: usize,
    ) -> (ClientHandle, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(capacity);
        let handle = ClientHandle::new(
            ClientKey::new(user, session).unwrap(),
            ConnectionId::generate(),
            1000,
            tx,
        );
        (handle, rx)
    }

    fn register(hub: &mut Hub, user: &str, session: &str) -> (ConnectionId, mpsc::Receiver<String>) {
        let (client, rx) = test_client(user, session, OUTBOUND_BUFFER_CAPACITY);
        let id = client.connection_id();
        hub.register(client);
        (id, rx)
    }

    #[test]
    fn test_broadcast_reaches_every_session_member_including_sender() {
        // テスト項目: ブロードキャストが同じセッションの全員（送信者を含む）に届く
        // given (前提条件):
        let mut hub = test_hub();
        let (_, mut rx_a) = register(&mut hub, "A", "S1");
        let (_, mut rx_b) = register(&mut hub, "B", "S1");
        let (_, mut rx_c) = register(&mut hub, "C", "S2");

        // when (操作):
        let queued = hub.route_broadcast(&BroadcastMessage::new("S1", "hi", "A", ""));

        // then (期待する結果):
        let expected = r#"{"contentType":"BoradcastMessage","sessionId":"S1","content":"hi","fromUser":"A","target":""}"#;
        assert_eq!(queued, 2);
        assert_eq!(rx_a.try_recv().unwrap(), expected);
        assert_eq!(rx_b.try_recv().unwrap(), expected);
        assert_eq!(rx_c.try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn test_broadcast_target_does_not_filter_recipients() {
        // テスト項目: target フィールドは配信先を絞り込まない
        // given (前提条件):
        let mut hub = test_hub();
        let (_, mut rx_a) = register(&mut hub, "A", "S1");
        let (_, mut rx_b) = register(&mut hub, "B", "S1");

        // when (操作):
        let queued = hub.route_broadcast(&BroadcastMessage::new("S1", "hi", "A", "B"));

        // then (期待する結果):
        assert_eq!(queued, 2);
        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_ok());
    }

    #[test]
    fn test_private_message_reaches_only_recipient() {
        // テスト項目: 個別メッセージは宛先クライアントのみに届く
        // given (前提条件):
        let mut hub = test_hub();
        let (_, mut rx_a) = register(&mut hub, "A", "S1");
        let (_, mut rx_b) = register(&mut hub, "B", "S1");
        let (_, mut rx_b_other) = register(&mut hub, "B", "S2");

        // when (操作):
        let delivered = hub.route_private(&PrivateMessage::new("A", "B", "S1", "psst"));

        // then (期待する結果):
        assert!(delivered);
        assert_eq!(
            rx_b.try_recv().unwrap(),
            r#"{"contentType":"PrivateMessage","message":"psst","sessionId":"S1","toUser":"B","fromUser":"A"}"#
        );
        assert_eq!(rx_a.try_recv(), Err(TryRecvError::Empty));
        assert_eq!(rx_b_other.try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn test_private_message_to_absent_client_is_dropped() {
        // テスト項目: 不在の宛先への個別メッセージは黙って破棄される
        // given (前提条件):
        let mut hub = test_hub();
        let (_, mut rx_a) = register(&mut hub, "A", "S1");

        // when (操作):
        let delivered = hub.route_private(&PrivateMessage::new("A", "ghost", "S1", "hello?"));
        let empty_target = hub.route_private(&PrivateMessage::new("A", "", "S1", "hello?"));

        // then (期待する結果):
        assert!(!delivered);
        assert!(!empty_target);
        assert_eq!(hub.clients.len(), 1);
        assert_eq!(rx_a.try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn test_overflowing_client_is_evicted_during_broadcast() {
        // テスト項目: バッファが満杯のクライアントはブロードキャスト中に切断される
        // given (前提条件):
        let mut hub = test_hub();
        let (slow, mut rx_slow) = test_client("slow", "S1", 2);
        hub.register(slow);
        let (_, mut rx_fast) = register(&mut hub, "fast", "S1");

        // when (操作):
        hub.route_broadcast(&BroadcastMessage::new("S1", "1", "fast", ""));
        hub.route_broadcast(&BroadcastMessage::new("S1", "2", "fast", ""));
        let queued = hub.route_broadcast(&BroadcastMessage::new("S1", "3", "fast", ""));

        // then (期待する結果):
        assert_eq!(queued, 1);
        assert!(!hub.clients.contains_key(&ClientKey::new("slow", "S1").unwrap()));
        // Frames already queued are still readable, then the buffer reports closed
        assert!(rx_slow.try_recv().is_ok());
        assert!(rx_slow.try_recv().is_ok());
        assert_eq!(rx_slow.try_recv(), Err(TryRecvError::Disconnected));
        for _ in 0..3 {
            assert!(rx_fast.try_recv().is_ok());
        }
    }

    #[test]
    fn test_overflowing_client_is_evicted_during_private_route() {
        // テスト項目: バッファが満杯の宛先は個別メッセージのルーティング中に切断される
        // given (前提条件):
        let mut hub = test_hub();
        let (client, mut rx) = test_client("B", "S1", 1);
        hub.register(client);
        assert!(hub.route_private(&PrivateMessage::new("A", "B", "S1", "first")));

        // when (操作):
        let delivered = hub.route_private(&PrivateMessage::new("A", "B", "S1", "second"));

        // then (期待する結果):
        assert!(!delivered);
        assert!(hub.clients.is_empty());
        assert!(rx.try_recv().is_ok());
        assert_eq!(rx.try_recv(), Err(TryRecvError::Disconnected));
    }

    #[test]
    fn test_client_with_dropped_receiver_is_removed() {
        // テスト項目: 受信側が既に終了したクライアントはルーティング時に削除される
        // given (前提条件):
        let mut hub = test_hub();
        let (_, rx) = register(&mut hub, "A", "S1");
        drop(rx);

        // when (操作):
        let queued = hub.route_broadcast(&BroadcastMessage::new("S1", "hi", "B", ""));

        // then (期待する結果):
        assert_eq!(queued, 0);
        assert!(hub.clients.is_empty());
    }

    #[test]
    fn test_unregister_closes_buffer_once() {
        // テスト項目: unregister はバッファを閉じ、重複呼び出しでは一度だけ削除する
        // given (前提条件):
        let mut hub = test_hub();
        let (id, mut rx) = register(&mut hub, "A", "S1");
        let key = ClientKey::new("A", "S1").unwrap();

        // when (操作):
        let first = hub.unregister(&key, id);
        let second = hub.unregister(&key, id);

        // then (期待する結果):
        assert!(first);
        assert!(!second);
        assert_eq!(rx.try_recv(), Err(TryRecvError::Disconnected));
    }

    #[test]
    fn test_reregister_replaces_entry_and_closes_old_buffer() {
        // テスト項目: 同じキーで再登録すると古いバッファが閉じられ、エントリが置き換わる
        // given (前提条件):
        let mut hub = test_hub();
        let (old_id, mut old_rx) = register(&mut hub, "A", "S1");

        // when (操作):
        let (new_id, mut new_rx) = register(&mut hub, "A", "S1");

        // then (期待する結果):
        assert_eq!(hub.clients.len(), 1);
        assert_eq!(old_rx.try_recv(), Err(TryRecvError::Disconnected));
        hub.route_private(&PrivateMessage::new("B", "A", "S1", "still here"));
        assert!(new_rx.try_recv().is_ok());
        assert_ne!(old_id, new_id);
    }

    #[test]
    fn test_stale_unregister_keeps_replacement() {
        // テスト項目: 置き換え前の接続からの unregister は新しいエントリを削除しない
        // given (前提条件):
        let mut hub = test_hub();
        let key = ClientKey::new("A", "S1").unwrap();
        let (old_id, _old_rx) = register(&mut hub, "A", "S1");
        let (new_id, _new_rx) = register(&mut hub, "A", "S1");

        // when (操作):
        let removed = hub.unregister(&key, old_id);

        // then (期待する結果):
        assert!(!removed);
        assert_eq!(hub.clients.get(&key).map(|c| c.connection_id), Some(new_id));
    }

    #[test]
    fn test_snapshot_filters_by_session_and_sorts() {
        // テスト項目: スナップショットがセッションで絞り込まれ、キー順に並ぶ
        // given (前提条件):
        let mut hub = test_hub();
        let _b = register(&mut hub, "bob", "S1");
        let _a = register(&mut hub, "alice", "S1");
        let _c = register(&mut hub, "carol", "S2");

        // when (操作):
        let s1 = hub.snapshot(Some("S1"));
        let all = hub.snapshot(None);

        // then (期待する結果):
        let users: Vec<&str> = s1.iter().map(|c| c.key.user_id()).collect();
        assert_eq!(users, vec!["alice", "bob"]);
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_run_processes_commands_in_order_and_shuts_down() {
        // テスト項目: Hub ループがコマンドを順に処理し、shutdown で全バッファを閉じて終了する
        // given (前提条件):
        let (hub, handle) = Hub::new();
        let task = tokio::spawn(hub.run());
        let (client, mut rx) = test_client("A", "S1", OUTBOUND_BUFFER_CAPACITY);

        // when (操作):
        handle.register(client).unwrap();
        handle
            .broadcast(BroadcastMessage::new("S1", "hi", "A", ""))
            .unwrap();
        let snapshot = handle.snapshot(Some("S1".to_string())).await.unwrap();
        handle.shutdown().unwrap();
        task.await.unwrap();

        // then (期待する結果):
        assert_eq!(snapshot.len(), 1);
        assert!(rx.recv().await.is_some());
        assert_eq!(rx.recv().await, None);
        assert!(handle.broadcast(BroadcastMessage::new("S1", "late", "A", "")).is_err());
    }

    #[tokio::test]
    async fn test_unregister_and_wait_is_acknowledged() {
        // テスト項目: unregister_and_wait は Hub の処理完了後に戻る
        // given (前提条件):
        let (hub, handle) = Hub::new();
        let task = tokio::spawn(hub.run());
        let (client, mut rx) = test_client("A", "S1", OUTBOUND_BUFFER_CAPACITY);
        let key = client.key().clone();
        let id = client.connection_id();
        handle.register(client).unwrap();

        // when (操作):
        let result = handle.unregister_and_wait(key, id).await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(rx.recv().await, None);
        assert!(handle.snapshot(None).await.unwrap().is_empty());

        handle.shutdown().unwrap();
        task.await.unwrap();
    }
}
