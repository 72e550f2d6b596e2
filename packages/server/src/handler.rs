//! WebSocket connection handling and event dispatch.

use std::sync::Arc;

use axum::{
    Json,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use relay_core::{ConnectionId, Outbound};

use super::{
    dto::{ClientEvent, ServerEvent},
    pusher::MessagePusher,
    state::AppState,
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

pub async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    // The transport assigns the connection id; clients never pick one.
    let id = ConnectionId::new();

    // Channel this connection receives its deliveries on
    let (tx, mut rx) = mpsc::unbounded_channel();
    state.pusher.register_client(id, tx).await;

    let outbound = {
        let mut relay = state.relay.lock().await;
        match relay.connect(id) {
            Ok(outbound) => outbound,
            Err(e) => {
                // Fresh ids make this unreachable with a sound transport.
                tracing::error!("failed to register connection {}: {}", id, e);
                state.pusher.unregister_client(id).await;
                return;
            }
        }
    };
    dispatch(state.pusher.as_ref(), outbound).await;
    tracing::info!("connection {} established", id);

    let (mut sender, mut receiver) = socket.split();

    let recv_state = state.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("websocket error on {}: {}", id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => handle_text(&recv_state, id, &text).await,
                Message::Ping(_) => {
                    tracing::debug!("received ping from {}", id);
                }
                Message::Close(_) => {
                    tracing::info!("connection {} requested close", id);
                    break;
                }
                _ => {}
            }
        }
    });

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    });

    // If either task completes, tear the other one down
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    // Disconnect transaction: registry removal, room purge and the
    // resulting presence broadcast resolve under one lock acquisition.
    let outbound = {
        let mut relay = state.relay.lock().await;
        relay.disconnect(id)
    };
    state.pusher.unregister_client(id).await;
    dispatch(state.pusher.as_ref(), outbound).await;
    tracing::info!("connection {} closed", id);
}

/// Parse one inbound frame, apply it to the relay and deliver the result.
async fn handle_text(state: &Arc<AppState>, id: ConnectionId, text: &str) {
    let event = match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!("unparseable frame from {}: {}", id, e);
            send_error(state.pusher.as_ref(), id, "malformed event").await;
            return;
        }
    };

    let result = {
        let mut relay = state.relay.lock().await;
        relay.apply(id, event.into())
    };

    match result {
        Ok(outbound) => dispatch(state.pusher.as_ref(), outbound).await,
        // Errors stay local to the connection that caused them.
        Err(e) => send_error(state.pusher.as_ref(), id, &e.to_string()).await,
    }
}

/// Serialize and deliver resolved fan-outs, one broadcast per event.
pub async fn dispatch(pusher: &dyn MessagePusher, outbound: Vec<Outbound>) {
    for out in outbound {
        let wire = ServerEvent::from(out.event);
        match serde_json::to_string(&wire) {
            Ok(json) => pusher.broadcast(&out.recipients, &json).await,
            Err(e) => tracing::error!("failed to serialize outbound event: {}", e),
        }
    }
}

/// Push an error event back to the originating connection only.
async fn send_error(pusher: &dyn MessagePusher, id: ConnectionId, message: &str) {
    let event = ServerEvent::Error {
        message: message.to_string(),
    };
    match serde_json::to_string(&event) {
        Ok(json) => {
            if pusher.push_to(id, &json).await.is_err() {
                tracing::debug!("connection {} gone before error delivery", id);
            }
        }
        Err(e) => tracing::error!("failed to serialize error event: {}", e),
    }
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}
