use super::AppState;
use crate::realtime::ConnectionHandle;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};

pub(crate) async fn websocket_handler(
    ws: WebSocketUpgrade,
    Path(client_id): Path<i64>,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| handle_session(socket, client_id, state))
}

/// Runs one session: register + join announcement on open, echo + relay per
/// inbound message, and on any exit path unregister + leave announcement.
async fn handle_session(socket: WebSocket, client_id: i64, state: AppState) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (handle, mut outbound) = ConnectionHandle::new(client_id);
    let connection_id = handle.id();
    let registry = state.registry.clone();

    registry.register(handle);
    registry.broadcast(&format!("#{client_id} joined the chat"));

    // Pump the connection's outbound queue into the socket. The queue end
    // closes when the registry drops the handle, which ends this task.
    let sender_task = tokio::spawn(async move {
        while let Some(message) = outbound.recv().await {
            if let Err(err) = ws_sender.send(Message::Text(message)).await {
                tracing::debug!(client_id, error = %err, "outbound socket write failed");
                break;
            }
        }
    });

    while let Some(msg) = ws_receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                if let Err(err) = registry.send(connection_id, &format!("You wrote: {text}")) {
                    tracing::warn!(client_id, error = %err, "echo delivery failed");
                    break;
                }
                registry.broadcast(&format!("#{client_id} says: {text}"));
            }
            Ok(Message::Close(_)) => break,
            // pings are answered by axum; binary frames are not part of the
            // chat protocol
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(client_id, error = %err, "websocket transport error");
                break;
            }
        }
    }

    // Cleanup runs on every exit path, graceful or abrupt. Unregister is
    // idempotent, so racing a broadcast-side eviction is fine.
    registry.unregister(connection_id);
    sender_task.abort();
    registry.broadcast(&format!(" #{client_id} left the chat"));
    tracing::info!(client_id, "session closed");
}
