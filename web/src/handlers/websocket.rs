//! WebSocket endpoint for live change notifications.
//!
//! Connections are one-directional: the server streams broadcast
//! envelopes, and nothing a client sends feeds back into the engine.
//! Each connection owns one hub subscription; dropping the connection
//! drops the subscription and deregisters the sink.

use crate::state::AppState;
use axum::{
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures::{SinkExt, stream::StreamExt};
use gatherly_core::broadcast::Subscription;
use tracing::{debug, info, warn};

/// GET `/ws`: upgrade and start streaming broadcasts.
#[allow(clippy::unused_async)] // Axum handler signature requires async
pub async fn handle(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    info!("WebSocket connection requested");
    let subscription = state.hub.subscribe();
    ws.on_upgrade(move |socket| handle_socket(socket, subscription))
}

/// Drive one connection until either side closes it.
///
/// Two tasks per connection: one forwards the subscription to the
/// socket, one drains client frames so pings and close frames are
/// processed.
async fn handle_socket(socket: WebSocket, mut subscription: Subscription) {
    info!("WebSocket connection established");

    let (mut sender, mut receiver) = socket.split();

    let mut send_task = tokio::spawn(async move {
        while let Some(message) = subscription.recv().await {
            if sender.send(Message::Text(message)).await.is_err() {
                // Client disconnected
                break;
            }
        }
        debug!("WebSocket send task terminated");
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Close(_) => {
                    info!("Client requested close");
                    break;
                }
                Message::Ping(_) | Message::Pong(_) => {
                    debug!("Keep-alive frame");
                }
                Message::Text(_) | Message::Binary(_) => {
                    // This endpoint only streams; inbound payloads are
                    // ignored.
                    warn!("Ignoring inbound WebSocket payload");
                }
            }
        }
        debug!("WebSocket receive task terminated");
    });

    tokio::select! {
        _ = (&mut send_task) => {
            recv_task.abort();
        },
        _ = (&mut recv_task) => {
            send_task.abort();
        },
    }

    info!("WebSocket connection closed");
}
