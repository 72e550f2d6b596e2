//! Relay state: the single owner of registry and room index.
//!
//! All mutations and all routing reads go through [`RelayState`], so a
//! caller that serializes access to it (a mutex, or a dedicated task)
//! gets the required "one event runs to completion before the next"
//! semantics for free. The transport feeds inbound [`Action`]s in and
//! delivers the returned [`Outbound`] events; it never touches the maps
//! underneath.

use crate::error::RelayError;
use crate::message::{Message, MessageIntent, TypingIntent, TypingNotice};
use crate::presence;
use crate::rooms::RoomIndex;
use crate::router;
use crate::session::{ConnectionId, Registry};
use crate::time::{Clock, SystemClock};
use crate::typing;

/// An inbound client action, already parsed off the wire.
#[derive(Debug, Clone)]
pub enum Action {
    /// Choose or change the display name.
    SetUsername { name: String },
    /// Join a room, leaving the previous one.
    JoinRoom { room: String },
    /// Send a public, room or private message.
    SendMessage(MessageIntent),
    /// Report a typing-state change.
    Typing(TypingIntent),
}

/// An outbound event for the transport to serialize and deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A routed chat message.
    ReceiveMessage(Message),
    /// A routed typing indicator.
    UserTyping(TypingNotice),
    /// Full presence snapshot, broadcast on every session change.
    OnlineUsers(Vec<String>),
    /// A user chose a display name for the first time.
    UserJoined { user: String },
    /// A named user disconnected.
    UserLeft { user: String },
}

/// A resolved fan-out handed to the transport for delivery.
///
/// Delivery is best-effort and fire-and-forget: the relay never learns
/// whether an individual recipient was reachable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    pub recipients: Vec<ConnectionId>,
    pub event: Event,
}

/// Connection registry plus room index behind one mutation API.
pub struct RelayState {
    registry: Registry,
    rooms: RoomIndex,
    clock: Box<dyn Clock>,
}

impl Default for RelayState {
    fn default() -> Self {
        Self::new()
    }
}

impl RelayState {
    pub fn new() -> Self {
        Self::with_clock(Box::new(SystemClock))
    }

    /// Build a relay with an injected clock, for deterministic timestamps
    /// in tests.
    pub fn with_clock(clock: Box<dyn Clock>) -> Self {
        Self {
            registry: Registry::new(),
            rooms: RoomIndex::new(),
            clock,
        }
    }

    /// Handle a transport connect: register the session and broadcast the
    /// presence snapshot.
    pub fn connect(&mut self, id: ConnectionId) -> Result<Vec<Outbound>, RelayError> {
        self.registry.register(id, self.clock.now_millis())?;
        tracing::info!("connection {} registered", id);
        Ok(vec![self.presence_broadcast()])
    }

    /// Handle a transport disconnect: remove the session, purge its room
    /// membership and broadcast the updated presence snapshot, as one
    /// transaction.
    ///
    /// Idempotent: a second disconnect for the same id emits nothing, so a
    /// transport double-firing its close hook produces no broadcast
    /// artifacts.
    pub fn disconnect(&mut self, id: ConnectionId) -> Vec<Outbound> {
        let Some(session) = self.registry.remove(id) else {
            return Vec::new();
        };
        self.rooms.purge(id);
        tracing::info!("connection {} removed from registry", id);

        let mut out = Vec::new();
        if let Some(name) = session.display_name {
            out.push(Outbound {
                recipients: self.registry.connection_ids(),
                event: Event::UserLeft { user: name },
            });
        }
        out.push(self.presence_broadcast());
        out
    }

    /// Dispatch one inbound action for a connection.
    ///
    /// Errors are local to the acting connection; no action can produce an
    /// error visible to anyone else.
    pub fn apply(&mut self, id: ConnectionId, action: Action) -> Result<Vec<Outbound>, RelayError> {
        match action {
            Action::SetUsername { name } => self.set_username(id, &name),
            Action::JoinRoom { room } => self.join_room(id, &room),
            Action::SendMessage(intent) => self.send_message(id, intent),
            Action::Typing(intent) => self.notify_typing(id, intent),
        }
    }

    fn set_username(&mut self, id: ConnectionId, name: &str) -> Result<Vec<Outbound>, RelayError> {
        let previous = self.registry.set_display_name(id, name)?;
        tracing::info!("connection {} set display name '{}'", id, name.trim());

        let mut out = Vec::new();
        if previous.is_none() {
            // First name choice is the moment a user becomes visible.
            let others: Vec<ConnectionId> = self
                .registry
                .connection_ids()
                .into_iter()
                .filter(|other| *other != id)
                .collect();
            out.push(Outbound {
                recipients: others,
                event: Event::UserJoined {
                    user: name.trim().to_string(),
                },
            });
        }
        out.push(self.presence_broadcast());
        Ok(out)
    }

    fn join_room(&mut self, id: ConnectionId, room: &str) -> Result<Vec<Outbound>, RelayError> {
        if !self.registry.contains(id) {
            return Err(RelayError::UnknownConnection(id));
        }
        self.rooms.join(id, room)?;
        tracing::info!("connection {} joined room '{}'", id, room.trim());
        Ok(Vec::new())
    }

    fn send_message(
        &mut self,
        id: ConnectionId,
        intent: MessageIntent,
    ) -> Result<Vec<Outbound>, RelayError> {
        let timestamp = self.clock.now_millis();
        let delivery = router::route(&self.registry, &self.rooms, id, intent, timestamp)?;
        if delivery.recipients.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![Outbound {
            recipients: delivery.recipients,
            event: Event::ReceiveMessage(delivery.payload),
        }])
    }

    fn notify_typing(
        &mut self,
        id: ConnectionId,
        intent: TypingIntent,
    ) -> Result<Vec<Outbound>, RelayError> {
        let delivery = typing::notify_typing(&self.registry, &self.rooms, id, intent)?;
        if delivery.recipients.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![Outbound {
            recipients: delivery.recipients,
            event: Event::UserTyping(delivery.payload),
        }])
    }

    fn presence_broadcast(&self) -> Outbound {
        Outbound {
            recipients: self.registry.connection_ids(),
            event: Event::OnlineUsers(presence::snapshot(&self.registry)),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn rooms(&self) -> &RoomIndex {
        &self.rooms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::FixedClock;

    fn relay() -> RelayState {
        RelayState::with_clock(Box::new(FixedClock::new(1_700_000_000_000)))
    }

    fn named(relay: &mut RelayState, name: &str) -> ConnectionId {
        let id = ConnectionId::new();
        relay.connect(id).unwrap();
        relay
            .apply(
                id,
                Action::SetUsername {
                    name: name.to_string(),
                },
            )
            .unwrap();
        id
    }

    fn online_users(out: &[Outbound]) -> Option<&Vec<String>> {
        out.iter().find_map(|outbound| match &outbound.event {
            Event::OnlineUsers(users) => Some(users),
            _ => None,
        })
    }

    #[test]
    fn test_connect_broadcasts_presence() {
        // given:
        let mut relay = relay();
        let id = ConnectionId::new();

        // when:
        let out = relay.connect(id).unwrap();

        // then: full snapshot to all connections (no names chosen yet)
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].recipients, vec![id]);
        assert_eq!(out[0].event, Event::OnlineUsers(Vec::new()));
    }

    #[test]
    fn test_connect_twice_is_a_fatal_invariant_violation() {
        // given:
        let mut relay = relay();
        let id = ConnectionId::new();
        relay.connect(id).unwrap();

        // when:
        let result = relay.connect(id);

        // then:
        assert_eq!(result, Err(RelayError::DuplicateConnection(id)));
    }

    #[test]
    fn test_first_set_username_emits_user_joined_to_others() {
        // given:
        let mut relay = relay();
        let alice = named(&mut relay, "alice");
        let bob = ConnectionId::new();
        relay.connect(bob).unwrap();

        // when:
        let out = relay
            .apply(
                bob,
                Action::SetUsername {
                    name: "bob".to_string(),
                },
            )
            .unwrap();

        // then: user_joined goes to everyone but bob, then the snapshot
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].recipients, vec![alice]);
        assert_eq!(
            out[0].event,
            Event::UserJoined {
                user: "bob".to_string()
            }
        );
        assert_eq!(
            online_users(&out),
            Some(&vec!["alice".to_string(), "bob".to_string()])
        );
    }

    #[test]
    fn test_rename_does_not_emit_user_joined_again() {
        // given:
        let mut relay = relay();
        let alice = named(&mut relay, "alice");

        // when:
        let out = relay
            .apply(
                alice,
                Action::SetUsername {
                    name: "alicia".to_string(),
                },
            )
            .unwrap();

        // then: just the presence snapshot
        assert_eq!(out.len(), 1);
        assert_eq!(online_users(&out), Some(&vec!["alicia".to_string()]));
    }

    #[test]
    fn test_join_room_requires_registration() {
        // given:
        let mut relay = relay();
        let ghost = ConnectionId::new();

        // when:
        let result = relay.apply(
            ghost,
            Action::JoinRoom {
                room: "dev".to_string(),
            },
        );

        // then:
        assert_eq!(result, Err(RelayError::UnknownConnection(ghost)));
    }

    #[test]
    fn test_send_message_stamps_server_time() {
        // given:
        let mut relay = relay();
        let alice = named(&mut relay, "alice");

        // when:
        let out = relay
            .apply(
                alice,
                Action::SendMessage(MessageIntent {
                    body: "hi".to_string(),
                    to: None,
                    room: None,
                }),
            )
            .unwrap();

        // then:
        let Event::ReceiveMessage(message) = &out[0].event else {
            panic!("expected a receive_message event");
        };
        assert_eq!(message.timestamp, 1_700_000_000_000);
    }

    #[test]
    fn test_dropped_private_message_emits_nothing() {
        // given:
        let mut relay = relay();
        let alice = named(&mut relay, "alice");

        // when:
        let out = relay
            .apply(
                alice,
                Action::SendMessage(MessageIntent {
                    body: "psst".to_string(),
                    to: Some("ghost".to_string()),
                    room: None,
                }),
            )
            .unwrap();

        // then:
        assert!(out.is_empty());
    }

    #[test]
    fn test_disconnect_cleans_up_and_broadcasts() {
        // given:
        let mut relay = relay();
        let alice = named(&mut relay, "alice");
        let bob = named(&mut relay, "bob");
        relay
            .apply(
                bob,
                Action::JoinRoom {
                    room: "dev".to_string(),
                },
            )
            .unwrap();

        // when:
        let out = relay.disconnect(bob);

        // then: user_left plus presence, room membership gone
        assert_eq!(out.len(), 2);
        assert_eq!(
            out[0].event,
            Event::UserLeft {
                user: "bob".to_string()
            }
        );
        assert_eq!(out[0].recipients, vec![alice]);
        assert_eq!(online_users(&out), Some(&vec!["alice".to_string()]));
        assert!(relay.rooms().members_of("dev").is_empty());
    }

    #[test]
    fn test_second_disconnect_emits_nothing() {
        // given:
        let mut relay = relay();
        let alice = named(&mut relay, "alice");
        relay.disconnect(alice);

        // when:
        let out = relay.disconnect(alice);

        // then:
        assert!(out.is_empty());
    }
}
