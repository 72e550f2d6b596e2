//! Presence tracking: the live "online users" view.
//!
//! Pure functions over the registry. After every session change the relay
//! broadcasts the full snapshot to all connections rather than a diff, so
//! clients stay trivially consistent even after a missed event.

use crate::session::Registry;

/// The current online-user list: display names in registration order.
///
/// Connections that have not chosen a name yet are not considered online
/// for presence purposes.
pub fn snapshot(registry: &Registry) -> Vec<String> {
    registry.display_names()
}
