//! Outbound loop: outbound buffer -> peer.

use std::{fmt::Display, time::Duration};

use axum::{body::Bytes, extract::ws::Message};
use futures_util::{Sink, SinkExt};
use tokio::{
    sync::mpsc,
    time::{Instant, MissedTickBehavior, interval_at, timeout},
};

use crate::config::ConnectionSettings;

use super::error::{ConnectionError, OutboundExit};

/// Flush the outbound buffer to the peer and keep the connection alive.
///
/// Returns when the Hub closes the buffer (after sending a close frame) or
/// when a write fails or times out.
pub(super) async fn send_loop<K>(
    mut sink: K,
    mut outbound: mpsc::Receiver<String>,
    settings: ConnectionSettings,
) -> OutboundExit
where
    K: Sink<Message> + Unpin,
    K::Error: Display,
{
    let write_wait = settings.write_wait();
    let period = settings.ping_period();
    let mut keepalive = interval_at(Instant::now() + period, period);
    keepalive.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let exit = loop {
        tokio::select! {
            frame = outbound.recv() => match frame {
                Some(frame) => {
                    let batch = coalesce(frame, &mut outbound);
                    if let Err(e) = write(&mut sink, Message::Text(batch.into()), write_wait).await {
                        break OutboundExit::Failed(e);
                    }
                    // Pings are only needed while idle
                    keepalive.reset();
                }
                None => {
                    if let Err(e) = write(&mut sink, Message::Close(None), write_wait).await {
                        tracing::debug!("Failed to send close frame: {}", e);
                    }
                    break OutboundExit::BufferClosed;
                }
            },
            _ = keepalive.tick() => {
                if let Err(e) = write(&mut sink, Message::Ping(Bytes::new()), write_wait).await {
                    break OutboundExit::Failed(e);
                }
            }
        }
    };

    let _ = timeout(write_wait, sink.close()).await;
    exit
}

/// Join `first` with every frame already queued behind it, newline separated.
fn coalesce(first: String, outbound: &mut mpsc::Receiver<String>) -> String {
    let queued = outbound.len();
    let mut batch = first;
    for _ in 0..queued {
        match outbound.try_recv() {
            Ok(next) => {
                batch.push('\n');
                batch.push_str(&next);
            }
            Err(_) => break,
        }
    }
    batch
}

async fn write<K>(sink: &mut K, message: Message, wait: Duration) -> Result<(), ConnectionError>
where
    K: Sink<Message> + Unpin,
    K::Error: Display,
{
    match timeout(wait, sink.send(message)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(ConnectionError::Transport(e.to_string())),
        Err(_) => Err(ConnectionError::WriteTimeout),
    }
}
