//! WebSocket upgrade handler for game clients.
//!
//! Connection lifecycle:
//! 1. Subscribe to the hub (so the client sees its own `live` update)
//! 2. Register presence for the peer address
//! 3. Forward broadcasts and answer pings until either side closes
//! 4. Unregister presence

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        ConnectInfo, State,
    },
    response::Response,
};
use futures::{stream::SplitSink, SinkExt, StreamExt};
use tokio::sync::{broadcast, mpsc};

use crate::application::handlers::presence::PresenceService;
use crate::domain::foundation::{ClientAddress, ConnectionId};
use crate::domain::relay::OutboundEvent;

use super::hub::ClientHub;
use super::messages::{encode_event, encode_pong, ClientMessage};

/// State required for WebSocket handling.
#[derive(Clone)]
pub struct WebSocketState {
    pub hub: ClientHub,
    pub presence: Arc<PresenceService>,
}

impl WebSocketState {
    pub fn new(hub: ClientHub, presence: Arc<PresenceService>) -> Self {
        Self { hub, presence }
    }
}

/// Route: `GET /ws`
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    State(state): State<WebSocketState>,
) -> Response {
    let address = ClientAddress::from(peer.ip());
    ws.on_upgrade(move |socket| handle_socket(socket, address, state))
}

/// Replies addressed to this socket only.
enum Direct {
    Pong,
}

async fn handle_socket(socket: WebSocket, address: ClientAddress, state: WebSocketState) {
    let events = state.hub.subscribe();
    let connection_id = state.presence.connect(address.clone()).await;
    tracing::debug!(connection_id = %connection_id, address = %address, "Client connected");

    let (sender, mut receiver) = socket.split();
    let (direct_tx, direct_rx) = mpsc::channel::<Direct>(8);

    let mut send_task = tokio::spawn(forward(sender, events, direct_rx, connection_id));

    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(Message::Text(text)) => {
                    if let Ok(ClientMessage::Ping) = serde_json::from_str::<ClientMessage>(&text) {
                        tracing::trace!(connection_id = %connection_id, "Received ping");
                        if direct_tx.send(Direct::Pong).await.is_err() {
                            break;
                        }
                    }
                }
                Ok(Message::Binary(_)) => {
                    tracing::debug!(connection_id = %connection_id, "Ignoring binary frame");
                }
                // Protocol-level ping/pong is answered by axum.
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
                Ok(Message::Close(_)) => {
                    tracing::debug!(connection_id = %connection_id, "Client sent close frame");
                    break;
                }
                Err(e) => {
                    tracing::debug!(connection_id = %connection_id, "Receive error: {}", e);
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    if state.presence.disconnect(&connection_id).await.is_none() {
        tracing::debug!(connection_id = %connection_id, "Disconnected socket was not registered");
    }
}

/// Pushes hub broadcasts and direct replies into the socket.
async fn forward(
    mut sender: SplitSink<WebSocket, Message>,
    mut events: broadcast::Receiver<OutboundEvent>,
    mut direct: mpsc::Receiver<Direct>,
    connection_id: ConnectionId,
) {
    loop {
        let frame = tokio::select! {
            received = events.recv() => match received {
                Ok(event) => encode_event(&event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(connection_id = %connection_id, skipped, "Client lagging, skipped events");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            Some(reply) = direct.recv() => match reply {
                Direct::Pong => encode_pong(),
            },
        };

        let text = match frame {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(connection_id = %connection_id, "Failed to encode frame: {}", e);
                continue;
            }
        };

        if let Err(e) = sender.send(Message::Text(text)).await {
            tracing::debug!(connection_id = %connection_id, "Send error, closing connection: {}", e);
            break;
        }
    }
}

/// Create axum router for the WebSocket endpoint.
pub fn websocket_router() -> axum::Router<WebSocketState> {
    use axum::routing::get;

    axum::Router::new().route("/ws", get(ws_handler))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn websocket_state_shares_hub() {
        let hub = ClientHub::new(8);
        let presence = Arc::new(PresenceService::new(Arc::new(hub.clone())));
        let state = WebSocketState::new(hub.clone(), presence.clone());

        let _rx = state.hub.subscribe();
        assert_eq!(hub.receiver_count(), 1);
        assert!(Arc::ptr_eq(&state.presence, &presence));
    }

    #[test]
    fn websocket_router_creates_route() {
        let _router = websocket_router();
    }
}
