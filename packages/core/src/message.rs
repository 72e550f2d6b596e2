//! Message and typing-event types shared by the router and broadcaster.

use crate::session::ConnectionId;

/// Routing scope of a message or typing event.
///
/// Exactly one scope applies; the enum makes the "exactly one
/// discriminator" invariant structural rather than a runtime check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Broadcast to every registered connection.
    Public,
    /// Broadcast to the members of a named room.
    Room(String),
    /// Addressed to a single display name.
    Private(String),
}

/// What a client asked to send, before routing.
///
/// `to` and `room` should be mutually exclusive on the wire, but the
/// router defines a precedence (`to` wins) so malformed input still
/// resolves deterministically.
#[derive(Debug, Clone, Default)]
pub struct MessageIntent {
    pub body: String,
    pub to: Option<String>,
    pub room: Option<String>,
}

/// A routed chat message, ready for delivery.
///
/// The sender is identified by display name as it was at send time, and
/// the timestamp is assigned by the server; client timestamps are never
/// trusted. Messages are not persisted, they exist only for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub sender: String,
    pub body: String,
    pub timestamp: i64,
    pub scope: Scope,
}

/// What a client reported about its typing state, before routing.
#[derive(Debug, Clone)]
pub struct TypingIntent {
    pub is_typing: bool,
    pub to: Option<String>,
    pub room: Option<String>,
}

/// A routed typing indicator. Transient UI hint, never timestamped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypingNotice {
    pub user: String,
    pub is_typing: bool,
}

/// A resolved fan-out: the payload plus every connection it goes to.
///
/// An empty recipient set is a valid outcome (an unresolvable private
/// target drops the payload silently).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery<T> {
    pub recipients: Vec<ConnectionId>,
    pub payload: T,
}

impl Scope {
    /// Derive the scope from intent discriminators, `to` over `room`.
    pub fn from_discriminators(to: Option<&str>, room: Option<&str>) -> Self {
        match (to, room) {
            (Some(name), _) => Scope::Private(name.to_string()),
            (None, Some(room)) => Scope::Room(room.to_string()),
            (None, None) => Scope::Public,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_takes_precedence_over_room() {
        // given: a malformed intent carrying both discriminators
        let scope = Scope::from_discriminators(Some("bob"), Some("dev"));

        // then:
        assert_eq!(scope, Scope::Private("bob".to_string()));
    }

    #[test]
    fn test_room_when_to_absent() {
        let scope = Scope::from_discriminators(None, Some("dev"));
        assert_eq!(scope, Scope::Room("dev".to_string()));
    }

    #[test]
    fn test_public_when_neither_present() {
        let scope = Scope::from_discriminators(None, None);
        assert_eq!(scope, Scope::Public);
    }
}
