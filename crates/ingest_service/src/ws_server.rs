//! Websocket connection handling.
//!
//! Sessions connect via `GET /ws` and receive a `new_data` event for every
//! reading ingested while they are connected. No backlog is replayed on
//! connect; history comes from `GET /data`.

use crate::api::AppState;
use crate::client::{ClientState, CLIENT_CHANNEL_BUFFER_SIZE};
use crate::error::{Error, Result};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use common::{ClientMessage, ServerMessage};
use futures::{SinkExt, StreamExt};
use metrics::{counter, gauge};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;
use tracing::{info, warn};

/// Websocket upgrade handler.
/// GET /ws
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Handle one websocket connection for its whole lifetime.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    // Bounded channel for outgoing messages; broadcast drops on overflow.
    let (tx, mut rx) = mpsc::channel::<Message>(CLIENT_CHANNEL_BUFFER_SIZE);

    let client = Arc::new(ClientState::new(tx));
    let client_id = state.registry.register(client.clone());

    counter!("dashboard_connections_total").increment(1);
    gauge!("dashboard_active_clients").set(state.registry.client_count() as f64);

    info!("Client {} connected", client_id);

    // Forward queued messages to the socket.
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if ws_tx.send(msg).await.is_err() {
                break;
            }
        }
    });

    // Keepalive pings.
    let mut ping_interval = interval(Duration::from_secs(30));
    ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;

            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(msg)) => {
                        if let Err(e) = handle_message(&client, msg) {
                            warn!("Error handling message from {}: {}", client_id, e);
                            let _ = client.send(&ServerMessage::Error {
                                message: e.to_string(),
                                code: "PROCESSING_ERROR".to_string(),
                            });
                        }
                    }
                    Some(Err(e)) => {
                        warn!("Websocket error for {}: {}", client_id, e);
                        break;
                    }
                    None => break,
                }
            }

            _ = ping_interval.tick() => {
                if client.tx.try_send(Message::Ping(vec![].into())).is_err() {
                    break;
                }
            }
        }
    }

    state.registry.unregister(&client_id);
    send_task.abort();

    counter!("dashboard_disconnections_total").increment(1);
    gauge!("dashboard_active_clients").set(state.registry.client_count() as f64);

    info!("Client {} disconnected", client_id);
}

/// Handle a single incoming websocket message.
fn handle_message(client: &Arc<ClientState>, msg: Message) -> Result<()> {
    match msg {
        Message::Text(text) => {
            let client_msg: ClientMessage = serde_json::from_str(&text)?;
            match client_msg {
                ClientMessage::Ping => {
                    client.update_ping();
                    client.send(&ServerMessage::Pong)
                }
            }
        }
        Message::Ping(data) => {
            client.update_ping();
            client
                .tx
                .try_send(Message::Pong(data))
                .map_err(|_| Error::ChannelSend)
        }
        Message::Pong(_) => {
            client.update_ping();
            Ok(())
        }
        // Close is handled by the connection loop; binary frames carry no
        // protocol meaning here.
        Message::Close(_) | Message::Binary(_) => Ok(()),
    }
}
