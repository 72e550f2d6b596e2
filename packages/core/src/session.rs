//! Connection registry: the live session table.
//!
//! The registry is the single owner of [`Session`] records, keyed by
//! [`ConnectionId`]. Everything else in the core (room index, router,
//! presence) works in terms of connection ids and resolves session data
//! through this table.

use std::collections::HashMap;
use std::fmt;

use uuid::Uuid;

use crate::error::RelayError;

/// Opaque identifier for one live client connection.
///
/// Assigned by the transport on connect, unique among currently connected
/// sessions. The id is the primary key everywhere in the core; display
/// names are a presentation concern layered on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Generate a fresh connection id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Mutable state attached to one connection.
#[derive(Debug, Clone)]
pub struct Session {
    /// Display name chosen by the client; unset until `set_username`.
    pub display_name: Option<String>,
    /// Unix timestamp (milliseconds) when the connection registered.
    pub connected_at: i64,
    /// Monotonic registration sequence number, used to keep presence
    /// listings and name lookup deterministic in registration order.
    seq: u64,
}

impl Session {
    fn new(connected_at: i64, seq: u64) -> Self {
        Self {
            display_name: None,
            connected_at,
            seq,
        }
    }
}

/// Map of connection id to session record.
#[derive(Debug, Default)]
pub struct Registry {
    sessions: HashMap<ConnectionId, Session>,
    next_seq: u64,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new connection with no display name and no room.
    ///
    /// Fails with [`RelayError::DuplicateConnection`] if the id is already
    /// registered; a correct transport never does this.
    pub fn register(&mut self, id: ConnectionId, connected_at: i64) -> Result<(), RelayError> {
        if self.sessions.contains_key(&id) {
            return Err(RelayError::DuplicateConnection(id));
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.sessions.insert(id, Session::new(connected_at, seq));
        Ok(())
    }

    /// Set (or overwrite) the display name for a connection.
    ///
    /// Names are trimmed; an empty or whitespace-only name is rejected with
    /// [`RelayError::InvalidName`]. Returns the previous name so callers can
    /// distinguish a first set from a rename.
    pub fn set_display_name(
        &mut self,
        id: ConnectionId,
        name: &str,
    ) -> Result<Option<String>, RelayError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(RelayError::InvalidName);
        }
        let session = self
            .sessions
            .get_mut(&id)
            .ok_or(RelayError::UnknownConnection(id))?;
        Ok(session.display_name.replace(trimmed.to_string()))
    }

    /// Resolve a display name to a connection id.
    ///
    /// Display names are not required to be unique. When several
    /// connections share a name, the earliest-registered one wins; the
    /// policy is undefined by contract but deterministic in practice.
    pub fn lookup_by_name(&self, name: &str) -> Option<ConnectionId> {
        self.sessions
            .iter()
            .filter(|(_, session)| session.display_name.as_deref() == Some(name))
            .min_by_key(|(_, session)| session.seq)
            .map(|(id, _)| *id)
    }

    /// Remove a connection, returning its session if it was registered.
    ///
    /// Idempotent: removing an unknown id is a no-op, which absorbs a
    /// transport double-firing its disconnect hook.
    pub fn remove(&mut self, id: ConnectionId) -> Option<Session> {
        self.sessions.remove(&id)
    }

    pub fn get(&self, id: ConnectionId) -> Option<&Session> {
        self.sessions.get(&id)
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.sessions.contains_key(&id)
    }

    /// Display names of all named sessions, in registration order.
    ///
    /// Sessions that have not chosen a name yet are not listed.
    pub fn display_names(&self) -> Vec<String> {
        let mut named: Vec<&Session> = self
            .sessions
            .values()
            .filter(|session| session.display_name.is_some())
            .collect();
        named.sort_by_key(|session| session.seq);
        named
            .iter()
            .filter_map(|session| session.display_name.clone())
            .collect()
    }

    /// All registered connection ids, in registration order.
    pub fn connection_ids(&self) -> Vec<ConnectionId> {
        let mut entries: Vec<(&ConnectionId, &Session)> = self.sessions.iter().collect();
        entries.sort_by_key(|(_, session)| session.seq);
        entries.iter().map(|(id, _)| **id).collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
