use axum::extract::State;
use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use hubwire_api::Message;
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

use super::HubState;

pub async fn events_ws(ws: WebSocketUpgrade, State(state): State<HubState>) -> impl IntoResponse {
    let client_id = Uuid::new_v4().to_string();
    ws.on_upgrade(move |socket| stream_events(socket, client_id, state))
}

/// Forwards every bus event to one client as a binary frame until either
/// side goes away. Text frames from the client are logged and dropped.
async fn stream_events(socket: WebSocket, client_id: String, state: HubState) {
    let (mut sender, mut receiver) = socket.split();
    let mut events = state.bus.subscribe();

    tracing::info!(client_id = %client_id, "Event stream client connected");

    let mut sent: u64 = 0;
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    let frame = event.encode_to_vec();
                    if sender.send(WsMessage::Binary(frame)).await.is_err() {
                        break;
                    }
                    sent += 1;
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(client_id = %client_id, skipped, "Event stream client lagging");
                }
                Err(RecvError::Closed) => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(WsMessage::Text(text))) => {
                    tracing::debug!(client_id = %client_id, "Ignoring text frame: {}", text);
                }
                Some(Ok(WsMessage::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    let _ = sender.close().await;
    tracing::info!(client_id = %client_id, sent, "Event stream client disconnected");
}
