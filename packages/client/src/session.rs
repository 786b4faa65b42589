//! WebSocket client session management.

use futures_util::{Sink, SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{self, protocol::Message},
};
use traveller_shared::time::now_millis;
use url::Url;

use crate::{
    command::Command,
    error::ClientError,
    formatter::MessageFormatter,
    ui::redisplay_prompt,
};

/// Build the upgrade URL for a session from the server base URL.
///
/// The session id is percent-encoded as a path segment and the user id as
/// a query value.
///
/// ```
/// use traveller_client::session_url;
///
/// assert_eq!(
///     session_url("ws://127.0.0.1:8080/", "S1", "alice").unwrap().as_str(),
///     "ws://127.0.0.1:8080/session/S1/ws?user_id=alice"
/// );
/// ```
pub fn session_url(base_url: &str, session_id: &str, user_id: &str) -> Result<Url, ClientError> {
    let invalid = |reason: String| ClientError::InvalidUrl {
        url: base_url.to_string(),
        reason,
    };

    let mut url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| invalid("cannot be a base URL".to_string()))?
        .pop_if_empty()
        .extend(["session", session_id, "ws"]);
    url.set_query(None);
    url.query_pairs_mut().append_pair("user_id", user_id);

    Ok(url)
}

/// Run one connection until the server goes away or input ends.
///
/// Returns `Ok(())` when the user closed the input, which ends the client.
pub async fn run_client_session(
    url: &str,
    user_id: &str,
    input: &mut mpsc::UnboundedReceiver<String>,
) -> Result<(), ClientError> {
    let (ws_stream, _response) = connect_async(url).await.map_err(|e| match e {
        tungstenite::Error::Http(response) => ClientError::Rejected(response.status().as_u16()),
        e => ClientError::ConnectionError(e.to_string()),
    })?;

    tracing::info!("Connected to session hub!");
    println!(
        "\nYou are '{}'. Type a message to broadcast, or /to <user> <message> to whisper. \
         Press Ctrl+C to exit.\n",
        user_id
    );
    redisplay_prompt(user_id);

    let (mut write, mut read) = ws_stream.split();

    // Spawn a task to handle incoming messages
    let user_for_read = user_id.to_string();
    let mut read_task = tokio::spawn(async move {
        while let Some(message) = read.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    print!("{}", MessageFormatter::format_text(&text, &user_for_read));
                    redisplay_prompt(&user_for_read);
                }
                Ok(Message::Binary(data)) => {
                    print!("{}", MessageFormatter::format_binary_message(data.len()));
                    redisplay_prompt(&user_for_read);
                }
                Ok(Message::Close(_)) => {
                    tracing::info!("Server closed the connection");
                    break;
                }
                Err(e) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    break;
                }
                _ => {}
            }
        }
    });

    // If either side completes, stop the other
    tokio::select! {
        _ = &mut read_task => {
            Err(ClientError::ConnectionError("Connection lost".to_string()))
        }
        result = forward_input(&mut write, input, user_id) => {
            read_task.abort();
            if result.is_ok() {
                write.close().await.ok();
            }
            result
        }
    }
}

/// Send every input line until the input closes.
async fn forward_input<W>(
    write: &mut W,
    input: &mut mpsc::UnboundedReceiver<String>,
    user_id: &str,
) -> Result<(), ClientError>
where
    W: Sink<Message, Error = tungstenite::Error> + Unpin,
{
    while let Some(line) = input.recv().await {
        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e);
                redisplay_prompt(user_id);
                continue;
            }
        };

        let frame = match command.to_frame() {
            Ok(frame) => frame,
            Err(e) => {
                println!("Not sent: {}", e);
                redisplay_prompt(user_id);
                continue;
            }
        };

        if let Err(e) = write.send(Message::text(frame)).await {
            tracing::warn!("Failed to send message: {}", e);
            return Err(ClientError::ConnectionError(e.to_string()));
        }

        print!("{}", MessageFormatter::format_sent_confirmation(now_millis()));
        redisplay_prompt(user_id);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_url_with_trailing_slash() {
        // テスト項目: 末尾のスラッシュを除いてセッション URL が組み立てられる
        // given (前提条件):
        let base = "ws://localhost:8080/";

        // when (操作):
        let url = session_url(base, "S1", "alice").unwrap();

        // then (期待する結果):
        assert_eq!(url.as_str(), "ws://localhost:8080/session/S1/ws?user_id=alice");
    }

    #[test]
    fn test_session_url_encodes_reserved_characters() {
        // テスト項目: ID に含まれる空白や予約文字がエンコードされる
        // given (前提条件):
        let base = "ws://localhost:8080";

        // when (操作):
        let url = session_url(base, "S 1/x", "a b&c#d").unwrap();

        // then (期待する結果):
        assert_eq!(
            url.as_str(),
            "ws://localhost:8080/session/S%201%2Fx/ws?user_id=a+b%26c%23d"
        );
        let user: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(user, vec![("user_id".to_string(), "a b&c#d".to_string())]);
    }

    #[test]
    fn test_session_url_rejects_invalid_base() {
        // テスト項目: 解釈できないベース URL はエラーになる
        // given (前提条件):
        let base = "not a url";

        // when (操作):
        let result = session_url(base, "S1", "alice");

        // then (期待する結果):
        assert!(matches!(result, Err(ClientError::InvalidUrl { .. })));
    }
}
