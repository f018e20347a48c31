//! WebSocket handler for viewer connections.
//!
//! Viewers are read-only subscribers: every relayed event arrives as one
//! JSON text frame. Inbound frames other than close are ignored.

use axum::{
    extract::{State, WebSocketUpgrade},
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use nanoid::nanoid;
use tracing::{debug, info, warn};

use crate::http::AppState;
use chatcast_core::relay::OutboundMessage;

/// GET /ws
pub async fn websocket_handler(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    // Relay frames are small JSON messages; 64KB is plenty.
    ws.max_message_size(64 * 1024)
        .on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: axum::extract::ws::WebSocket, state: AppState) {
    let connection_id = nanoid!();
    let mut messages = state.hub.subscribe(connection_id.clone());

    state.hub.send_to(
        &connection_id,
        OutboundMessage::Status {
            message: "Connected to live event relay server".to_string(),
        },
    );

    if let Some(stream_id) = state.coordinator.current_stream_id() {
        debug!(
            connection_id = %connection_id,
            stream_id = %stream_id,
            "Viewer attached while a session is active"
        );
    }

    let (mut ws_tx, mut ws_rx) = socket.split();

    loop {
        tokio::select! {
            message = messages.recv() => {
                let Some(message) = message else {
                    // Hub evicted this subscriber.
                    break;
                };
                let text = match serde_json::to_string(&message) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(connection_id = %connection_id, "Failed to encode message: {e}");
                        continue;
                    }
                };
                if ws_tx
                    .send(axum::extract::ws::Message::Text(text.into()))
                    .await
                    .is_err()
                {
                    break;
                }
            }
            frame = ws_rx.next() => {
                match frame {
                    Some(Ok(axum::extract::ws::Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        debug!(connection_id = %connection_id, "WebSocket error: {e}");
                        break;
                    }
                    Some(Ok(_)) => {
                        // Viewers do not speak; drop whatever they sent.
                    }
                }
            }
        }
    }

    state.hub.unsubscribe(&connection_id);
    info!(connection_id = %connection_id, "Viewer connection closed");
}
