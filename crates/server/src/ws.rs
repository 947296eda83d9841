//! Websocket transport: one task per connection, with an unbounded outbound
//! channel so the engine can queue frames without awaiting the socket.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use log::{debug, info};
use tokio::sync::mpsc;

use nonet::{ConnCtx, ConnectionSink, Router, SinkClosed};

static NEXT_CONN_ID: AtomicU64 = AtomicU64::new(1);

/// Send half of a connection, backed by the socket task's outbound channel.
struct ChannelSink {
    tx: mpsc::UnboundedSender<String>,
}

impl ConnectionSink for ChannelSink {
    fn send(&self, frame: String) -> Result<(), SinkClosed> {
        self.tx.send(frame).map_err(|_| SinkClosed)
    }

    fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }
}

pub async fn ws_handler(
    State(router): State<Arc<Router>>,
    upgrade: WebSocketUpgrade,
) -> impl IntoResponse {
    upgrade.on_upgrade(move |socket| handle_socket(router, socket))
}

async fn handle_socket(router: Arc<Router>, mut socket: WebSocket) {
    let conn_id = NEXT_CONN_ID.fetch_add(1, Ordering::Relaxed);
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let ctx = ConnCtx {
        conn_id,
        sink: Arc::new(ChannelSink { tx }),
    };
    info!("connection {conn_id} opened");

    loop {
        tokio::select! {
            // Outbound: drain queued frames onto the socket.
            Some(frame) = rx.recv() => {
                if socket.send(Message::Text(frame)).await.is_err() {
                    break;
                }
            }
            // Inbound: hand text frames to the engine.
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => router.handle_frame(&ctx, &text),
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    router.handle_disconnect(conn_id);
    debug!("connection {conn_id} closed");
}
