//! Shared application state.

use std::sync::Arc;

use tokio::sync::Mutex;

use relay_core::RelayState;

use super::pusher::MessagePusher;

/// State shared by all connection handlers.
///
/// The relay mutex is the single serialization domain for session state:
/// every mutation and every routing read happens while it is held, so a
/// concurrent join or disconnect can never be observed mid-update by a
/// routing decision. Delivery happens after the lock is released and
/// fans out independently per recipient.
pub struct AppState {
    pub relay: Mutex<RelayState>,
    pub pusher: Arc<dyn MessagePusher>,
}

impl AppState {
    pub fn new(relay: RelayState, pusher: Arc<dyn MessagePusher>) -> Arc<Self> {
        Arc::new(Self {
            relay: Mutex::new(relay),
            pusher,
        })
    }
}
