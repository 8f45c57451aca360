//! WebSocket endpoint for client sessions

use axum::{
    Router,
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::IntoResponse,
    routing::get,
};
use calbridge_core::BroadcastMessage;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::bridge::AppState;
use crate::dispatcher::Dispatcher;

pub fn router() -> Router<AppState> {
    Router::new().route("/ws", get(ws_handler))
}

/// GET /ws - Upgrade to a session socket
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (ws_tx, mut ws_rx) = socket.split();
    let (session, outbound_rx) = state.on_connect().await;
    let session_id = session.id();

    let send_task = tokio::spawn(forward_outbound(ws_tx, outbound_rx));

    let mut dispatcher = Dispatcher::new(state.clone(), session);

    // Commands from one session are handled strictly in order
    while let Some(result) = ws_rx.next().await {
        match result {
            Ok(Message::Text(text)) => dispatcher.handle_text(text.as_str()).await,
            Ok(Message::Close(_)) => {
                debug!(%session_id, "client sent close frame");
                break;
            }
            Ok(_) => continue,
            Err(e) => {
                warn!(%session_id, error = %e, "websocket error");
                break;
            }
        }
    }

    dispatcher.close().await;
    send_task.abort();
    info!(%session_id, "websocket connection closed");
}

/// Drain a session's outbound queue into the socket.
async fn forward_outbound(
    mut ws_tx: SplitSink<WebSocket, Message>,
    mut outbound_rx: mpsc::Receiver<BroadcastMessage>,
) {
    while let Some(message) = outbound_rx.recv().await {
        let json = match serde_json::to_string(&message) {
            Ok(json) => json,
            Err(e) => {
                error!(message_type = message.type_name(), error = %e, "failed to serialize message");
                continue;
            }
        };

        if ws_tx.send(Message::Text(json.into())).await.is_err() {
            debug!("websocket send failed, client disconnected");
            break;
        }
    }
}
