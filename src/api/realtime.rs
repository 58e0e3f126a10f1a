/// Real-time WebSocket channel
///
/// A small JSON protocol for the editor: keep-alive pings, subscription
/// acknowledgements and workflow execution with the result pushed back on the
/// same socket. Malformed messages get an error reply; the socket stays open.

use crate::api::workflows::AppState;
use crate::runtime::result::ExecutionResult;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
    routing::any,
    Router,
};
use serde::{Deserialize, Serialize};

/// Messages accepted from clients, discriminated by `type`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    Ping,
    Subscribe { workflow_id: String },
    Execute { workflow_id: String },
}

/// Messages pushed to clients, discriminated by `type`
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Pong,
    Subscribed { workflow_id: String },
    ExecutionResult { result: ExecutionResult },
    Error { message: String },
}

/// Create the real-time route
pub fn create_realtime_routes() -> Router<AppState> {
    Router::new().route("/ws", any(websocket_upgrade))
}

async fn websocket_upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: AppState) {
    tracing::info!("🔌 WebSocket client connected");

    while let Some(message) = socket.recv().await {
        let message = match message {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!("WebSocket read error: {}", e);
                break;
            }
        };

        let reply = match message {
            Message::Text(text) => handle_message(&state, text.as_str()).await,
            Message::Close(_) => break,
            _ => continue,
        };

        let payload = match serde_json::to_string(&reply) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!("Failed to encode WebSocket reply: {}", e);
                continue;
            }
        };

        if let Err(e) = socket.send(Message::Text(payload.into())).await {
            tracing::warn!("WebSocket write error: {}", e);
            break;
        }
    }

    tracing::info!("🔌 WebSocket client disconnected");
}

/// Decode one client message and produce the reply
pub async fn handle_message(state: &AppState, text: &str) -> ServerMessage {
    let message: ClientMessage = match serde_json::from_str(text) {
        Ok(message) => message,
        Err(e) => {
            tracing::debug!("Rejected WebSocket message: {}", e);
            return ServerMessage::Error {
                message: format!("invalid message: {}", e),
            };
        }
    };

    match message {
        ClientMessage::Ping => ServerMessage::Pong,
        ClientMessage::Subscribe { workflow_id } => ServerMessage::Subscribed { workflow_id },
        ClientMessage::Execute { workflow_id } => {
            match state.engine.execute_workflow(&workflow_id).await {
                Ok(result) => ServerMessage::ExecutionResult { result },
                Err(e) => ServerMessage::Error {
                    message: e.to_string(),
                },
            }
        }
    }
}
