//! Delivery seam: pushes serialized events to connection channels.
//!
//! WebSocket creation happens in the handler; this layer only holds the
//! per-connection senders and writes to them. Splitting the two keeps
//! routing decisions testable without a live socket.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};

use relay_core::ConnectionId;

/// Sender half of a connection's outbound channel.
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// Abstraction over event delivery to connections.
#[async_trait]
pub trait MessagePusher: Send + Sync {
    async fn register_client(&self, id: ConnectionId, sender: PusherChannel);

    async fn unregister_client(&self, id: ConnectionId);

    /// Push to a single connection. Fails if the connection is gone.
    async fn push_to(&self, id: ConnectionId, content: &str) -> Result<(), PushError>;

    /// Best-effort fan-out: individual send failures are logged and
    /// skipped, one dead recipient never blocks the rest.
    async fn broadcast(&self, targets: &[ConnectionId], content: &str);
}

/// Delivery failure for a single push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushError {
    pub id: ConnectionId,
}

impl std::fmt::Display for PushError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to push to connection {}", self.id)
    }
}

impl std::error::Error for PushError {}

/// Pusher over per-connection unbounded mpsc senders.
#[derive(Default)]
pub struct WebSocketMessagePusher {
    clients: Mutex<HashMap<ConnectionId, PusherChannel>>,
}

impl WebSocketMessagePusher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(&self, id: ConnectionId, sender: PusherChannel) {
        let mut clients = self.clients.lock().await;
        clients.insert(id, sender);
        tracing::debug!("connection {} registered with pusher", id);
    }

    async fn unregister_client(&self, id: ConnectionId) {
        let mut clients = self.clients.lock().await;
        clients.remove(&id);
        tracing::debug!("connection {} unregistered from pusher", id);
    }

    async fn push_to(&self, id: ConnectionId, content: &str) -> Result<(), PushError> {
        let clients = self.clients.lock().await;
        let sender = clients.get(&id).ok_or(PushError { id })?;
        sender
            .send(content.to_string())
            .map_err(|_| PushError { id })
    }

    async fn broadcast(&self, targets: &[ConnectionId], content: &str) {
        let clients = self.clients.lock().await;
        for target in targets {
            match clients.get(target) {
                Some(sender) => {
                    if sender.send(content.to_string()).is_err() {
                        tracing::warn!("failed to push to connection {}, skipping", target);
                    }
                }
                // The connection may have disconnected between resolution
                // and delivery; best-effort means we just move on.
                None => {
                    tracing::debug!("connection {} gone before delivery, skipping", target);
                }
            }
        }
    }
}
