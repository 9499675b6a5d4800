use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use futures::SinkExt;
use futures::StreamExt;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{info, warn};

use crate::state::AppState;

/// Joins one room (`{orderId}` or `seller_{sellerId}`) and forwards its
/// events as JSON text frames. Best-effort: a slow client that lags behind
/// the room buffer simply misses the dropped events.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(room): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, room))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, room: String) {
    let (mut sender, mut receiver) = socket.split();
    let mut events = BroadcastStream::new(state.broadcaster.subscribe(&room));

    info!(room = %room, "websocket client joined room");

    let send_task = tokio::spawn(async move {
        while let Some(received) = events.next().await {
            let event = match received {
                Ok(event) => event,
                Err(BroadcastStreamRecvError::Lagged(missed)) => {
                    warn!(missed, "websocket client lagged; events dropped");
                    continue;
                }
            };

            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(err) => {
                    warn!(error = %err, "failed to serialize event for ws");
                    continue;
                }
            };

            if sender.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
    });

    let recv_task = tokio::spawn(async move {
        while let Some(Ok(_msg)) = receiver.next().await {}
    });

    tokio::select! {
        _ = send_task => {},
        _ = recv_task => {},
    }

    info!(room = %room, "websocket client disconnected");
}
