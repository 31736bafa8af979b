//! WebSocket upgrade handler and message loop
//!
//! Each connection gets:
//!
//! 1. A connection record and a bounded outbound queue from the [`Gateway`]
//! 2. A write loop that drains the queue into the WebSocket
//! 3. A read loop that decodes frames and dispatches them to the broadcaster
//! 4. Leave + close cleanup on close frame, transport error or eviction

use super::gateway::PeerReceiver;
use crate::core::connection::Connection;
use crate::core::error::RelayError;
use crate::core::protocol::InboundMessage;
use crate::rooms::RoomBroadcaster;
use crate::server::host::RelayHost;
use axum::extract::ws::{Message, Utf8Bytes, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use futures::SinkExt;
use futures::stream::StreamExt;
use std::sync::Arc;

/// Upgrade the HTTP connection and spawn the message loop
pub fn upgrade(ws: WebSocketUpgrade, host: Arc<RelayHost>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, host))
}

/// Handle a single WebSocket connection until it closes
async fn handle_socket(socket: WebSocket, host: Arc<RelayHost>) {
    let (mut conn, PeerReceiver { mut frames, evicted }) = host.gateway.accept();

    let (mut ws_write, mut ws_read) = socket.split();

    let conn_id_write = conn.id().clone();

    // Write loop: forward queued frames to the WebSocket
    let write_handle = tokio::spawn(async move {
        while let Some(frame) = frames.recv().await {
            if ws_write.send(frame.into_message()).await.is_err() {
                tracing::debug!(
                    connection_id = %conn_id_write,
                    "WebSocket write failed, closing"
                );
                break;
            }
        }
    });

    // Read loop: process client frames
    loop {
        tokio::select! {
            _ = evicted.notified() => {
                tracing::debug!(connection_id = %conn.id(), "Connection evicted");
                break;
            }
            next = ws_read.next() => match next {
                Some(Ok(Message::Text(text))) => {
                    on_frame(&host.broadcaster, &mut conn, text).await;
                }
                Some(Ok(Message::Close(_))) => {
                    tracing::debug!(connection_id = %conn.id(), "Client sent close frame");
                    break;
                }
                Some(Ok(_)) => {
                    // Binary frames are not part of the protocol; ping/pong is handled by axum
                }
                Some(Err(e)) => {
                    tracing::debug!(
                        connection_id = %conn.id(),
                        error = %e,
                        "WebSocket read error"
                    );
                    break;
                }
                None => break,
            },
        }
    }

    // Cleanup
    host.broadcaster.leave(&mut conn).await;
    host.gateway.close(&mut conn);
    write_handle.abort();
}

/// Decode one text frame and dispatch it
///
/// Malformed frames are logged and dropped; the connection stays open.
pub async fn on_frame(broadcaster: &RoomBroadcaster, conn: &mut Connection, text: Utf8Bytes) {
    let message = match InboundMessage::decode(text) {
        Ok(message) => message,
        Err(e) => {
            let err = RelayError::from(e);
            tracing::warn!(
                connection_id = %conn.id(),
                error_code = err.error_code(),
                error = %err,
                "Error parsing message, dropping frame"
            );
            return;
        }
    };

    tracing::debug!(
        connection_id = %conn.id(),
        message_type = message.message_type(),
        "Received message"
    );

    match message {
        InboundMessage::Join { room, user_name } => {
            broadcaster.join(conn, room, user_name).await;
        }
        InboundMessage::Relay(frame) => {
            broadcaster.relay(conn, &frame).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SlowConsumerPolicy;
    use crate::core::protocol::OutboundFrame;
    use crate::server::exposure::websocket::Gateway;
    use tokio::sync::mpsc;

    fn setup() -> (Arc<Gateway>, RoomBroadcaster) {
        let gateway = Arc::new(Gateway::new(16, SlowConsumerPolicy::Drop));
        let broadcaster = RoomBroadcaster::new(gateway.clone());
        (gateway, broadcaster)
    }

    fn text(s: &str) -> Utf8Bytes {
        Utf8Bytes::from(s.to_string())
    }

    fn drain(rx: &mut mpsc::Receiver<OutboundFrame>) -> Vec<String> {
        let mut out = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            out.push(frame.as_str().to_string());
        }
        out
    }

    #[tokio::test]
    async fn test_full_scenario_through_on_frame() {
        let (gateway, broadcaster) = setup();
        let (mut a, mut a_rx) = gateway.accept();
        let (mut b, mut b_rx) = gateway.accept();

        on_frame(
            &broadcaster,
            &mut a,
            text(r#"{"type":"join","room":"r1","userName":"alice"}"#),
        )
        .await;
        assert_eq!(
            drain(&mut a_rx.frames),
            vec![r#"{"type":"joined","room":"r1"}"#]
        );

        on_frame(
            &broadcaster,
            &mut b,
            text(r#"{"type":"join","room":"r1","userName":"bob"}"#),
        )
        .await;
        assert_eq!(
            drain(&mut a_rx.frames),
            vec![r#"{"type":"user-joined","userName":"bob"}"#]
        );
        assert_eq!(
            drain(&mut b_rx.frames),
            vec![r#"{"type":"joined","room":"r1"}"#]
        );

        on_frame(&broadcaster, &mut a, text(r#"{"type":"chat","text":"hi"}"#)).await;
        assert_eq!(
            drain(&mut b_rx.frames),
            vec![r#"{"type":"chat","text":"hi"}"#]
        );
        assert!(drain(&mut a_rx.frames).is_empty());

        broadcaster.leave(&mut a).await;
        gateway.close(&mut a);
        assert_eq!(
            drain(&mut b_rx.frames),
            vec![r#"{"type":"user-left","userName":"alice"}"#]
        );
        assert!(broadcaster.has_room("r1").await);

        broadcaster.leave(&mut b).await;
        gateway.close(&mut b);
        assert!(!broadcaster.has_room("r1").await);
        assert_eq!(gateway.connection_count(), 0);
    }

    #[tokio::test]
    async fn test_malformed_frame_is_dropped() {
        let (gateway, broadcaster) = setup();
        let (mut a, mut a_rx) = gateway.accept();
        let (mut b, mut b_rx) = gateway.accept();
        on_frame(&broadcaster, &mut a, text(r#"{"type":"join","room":"r1"}"#)).await;
        on_frame(&broadcaster, &mut b, text(r#"{"type":"join","room":"r1"}"#)).await;
        drain(&mut a_rx.frames);
        drain(&mut b_rx.frames);

        on_frame(&broadcaster, &mut a, text("definitely not json")).await;
        on_frame(&broadcaster, &mut a, text(r#"{"type":"join"}"#)).await;

        assert!(drain(&mut b_rx.frames).is_empty());
        assert!(a.is_open());
        assert_eq!(a.room(), Some("r1"));

        // Connection keeps working afterwards
        on_frame(&broadcaster, &mut a, text(r#"{"type":"ping"}"#)).await;
        assert_eq!(drain(&mut b_rx.frames), vec![r#"{"type":"ping"}"#]);
    }

    #[tokio::test]
    async fn test_relay_before_join_is_silent() {
        let (gateway, broadcaster) = setup();
        let (mut a, mut a_rx) = gateway.accept();

        on_frame(&broadcaster, &mut a, text(r#"{"type":"chat","text":"hi"}"#)).await;

        assert!(drain(&mut a_rx.frames).is_empty());
        assert_eq!(broadcaster.room_count().await, 0);
    }

    #[tokio::test]
    async fn test_anonymous_join_announces_default_name() {
        let (gateway, broadcaster) = setup();
        let (mut a, mut a_rx) = gateway.accept();
        let (mut b, _b_rx) = gateway.accept();
        on_frame(&broadcaster, &mut a, text(r#"{"type":"join","room":"r1"}"#)).await;
        drain(&mut a_rx.frames);

        on_frame(&broadcaster, &mut b, text(r#"{"type":"join","room":"r1"}"#)).await;

        assert_eq!(
            drain(&mut a_rx.frames),
            vec![r#"{"type":"user-joined","userName":"Anonymous"}"#]
        );
    }
}
