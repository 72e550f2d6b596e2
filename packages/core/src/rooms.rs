//! Room membership index.
//!
//! Rooms exist implicitly: one appears when its first member joins and
//! vanishes when its last member leaves. The index keeps a forward map
//! (room name to member set) and a reverse map (connection to its current
//! room); the two are always mutated together so they cannot drift.

use std::collections::{HashMap, HashSet};

use crate::error::RelayError;
use crate::session::ConnectionId;

/// Bidirectional room membership index.
///
/// A connection occupies at most one room. Joining a new room fully
/// supersedes the previous membership.
#[derive(Debug, Default)]
pub struct RoomIndex {
    rooms: HashMap<String, HashSet<ConnectionId>>,
    occupancy: HashMap<ConnectionId, String>,
}

impl RoomIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move a connection into a room, leaving its previous room first.
    ///
    /// Room names are trimmed; an empty or whitespace-only name is
    /// rejected with [`RelayError::InvalidRoom`].
    pub fn join(&mut self, id: ConnectionId, room: &str) -> Result<(), RelayError> {
        let trimmed = room.trim();
        if trimmed.is_empty() {
            return Err(RelayError::InvalidRoom);
        }
        self.purge(id);
        self.rooms.entry(trimmed.to_string()).or_default().insert(id);
        self.occupancy.insert(id, trimmed.to_string());
        Ok(())
    }

    /// Remove a connection from whatever room it occupies.
    ///
    /// Idempotent; part of the disconnect transaction. An emptied member
    /// set is dropped so rooms never outlive their last member.
    pub fn purge(&mut self, id: ConnectionId) {
        if let Some(room) = self.occupancy.remove(&id)
            && let Some(members) = self.rooms.get_mut(&room)
        {
            members.remove(&id);
            if members.is_empty() {
                self.rooms.remove(&room);
            }
        }
    }

    /// Members of a room, sorted for deterministic iteration.
    ///
    /// An unknown room is an empty set, not an error.
    pub fn members_of(&self, room: &str) -> Vec<ConnectionId> {
        let mut members: Vec<ConnectionId> = self
            .rooms
            .get(room)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        members.sort();
        members
    }

    /// The room a connection currently occupies, if any.
    pub fn room_of(&self, id: ConnectionId) -> Option<&str> {
        self.occupancy.get(&id).map(String::as_str)
    }

    /// Number of rooms with at least one member.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
