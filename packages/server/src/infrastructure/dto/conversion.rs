//! Conversions between domain messages and wire DTOs.

use traveller_shared::time::timestamp_to_rfc3339;

use crate::{
    domain::{BroadcastMessage, PrivateMessage},
    infrastructure::hub::ClientSummary,
};

use super::{http::ConnectedClientDto, websocket::OutboundFrame};

impl From<&BroadcastMessage> for OutboundFrame {
    fn from(msg: &BroadcastMessage) -> Self {
        OutboundFrame::Broadcast {
            session_id: msg.session_id.clone(),
            content: msg.content.clone(),
            from_user: msg.from_user.clone(),
            target: msg.target.clone(),
        }
    }
}

impl From<&PrivateMessage> for OutboundFrame {
    fn from(msg: &PrivateMessage) -> Self {
        OutboundFrame::Private {
            message: msg.message.clone(),
            session_id: msg.session_id.clone(),
            to_user: msg.to_user.clone(),
            from_user: msg.from_user.clone(),
        }
    }
}

impl From<&ClientSummary> for ConnectedClientDto {
    fn from(summary: &ClientSummary) -> Self {
        ConnectedClientDto {
            user_id: summary.key.user_id().to_string(),
            session_id: summary.key.session_id().to_string(),
            connected_at: timestamp_to_rfc3339(summary.connected_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ClientKey;

    #[test]
    fn test_broadcast_message_to_frame() {
        // テスト項目: BroadcastMessage が Broadcast フレームに変換される
        // given (前提条件):
        let msg = BroadcastMessage::new("S1", "hi", "alice", "NONE");

        // when (操作):
        let frame = OutboundFrame::from(&msg);

        // then (期待する結果):
        assert_eq!(
            frame,
            OutboundFrame::Broadcast {
                session_id: "S1".to_string(),
                content: "hi".to_string(),
                from_user: "alice".to_string(),
                target: "NONE".to_string(),
            }
        );
    }

    #[test]
    fn test_private_message_to_frame() {
        // テスト項目: PrivateMessage が Private フレームに変換される
        // given (前提条件):
        let msg = PrivateMessage::new("alice", "bob", "S1", "psst");

        // when (操作):
        let frame = OutboundFrame::from(&msg);

        // then (期待する結果):
        assert_eq!(
            frame,
            OutboundFrame::Private {
                message: "psst".to_string(),
                session_id: "S1".to_string(),
                to_user: "bob".to_string(),
                from_user: "alice".to_string(),
            }
        );
    }

    #[test]
    fn test_client_summary_to_dto() {
        // テスト項目: ClientSummary が接続時刻を RFC 3339 にした DTO に変換される
        // given (前提条件):
        let summary = ClientSummary {
            key: ClientKey::new("alice", "S1").unwrap(),
            connected_at: 0,
        };

        // when (操作):
        let dto = ConnectedClientDto::from(&summary);

        // then (期待する結果):
        assert_eq!(dto.user_id, "alice");
        assert_eq!(dto.session_id, "S1");
        assert_eq!(dto.connected_at, "1970-01-01T00:00:00.000Z");
    }
}
