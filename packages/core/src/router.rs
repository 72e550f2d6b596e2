//! Message router: resolves an outbound message intent to its recipients.

use crate::error::RelayError;
use crate::message::{Delivery, Message, MessageIntent, Scope};
use crate::rooms::RoomIndex;
use crate::session::{ConnectionId, Registry};

/// Resolve a message intent to a finalized [`Message`] and its recipients.
///
/// Resolution rules:
/// - the sender must have a display name (`NotJoined` otherwise) and a
///   non-empty body (`EmptyBody` otherwise);
/// - `to` takes precedence over `room`; with neither the message is public;
/// - private: recipients are the resolved target plus the sender (the
///   sender sees their own private messages). An unresolvable target
///   drops the message silently — empty recipient set, no error;
/// - room: recipients are the room members at the moment of routing. The
///   sender is included only by virtue of being a member;
/// - public: recipients are all currently registered connections.
///
/// The timestamp is supplied by the caller from the server clock.
pub fn route(
    registry: &Registry,
    rooms: &RoomIndex,
    sender: ConnectionId,
    intent: MessageIntent,
    timestamp: i64,
) -> Result<Delivery<Message>, RelayError> {
    let sender_name = resolve_sender_name(registry, sender)?;

    let body = intent.body.trim();
    if body.is_empty() {
        return Err(RelayError::EmptyBody);
    }

    let scope = Scope::from_discriminators(intent.to.as_deref(), intent.room.as_deref());
    let recipients = resolve_recipients(registry, rooms, sender, &scope);

    if recipients.is_empty() {
        tracing::debug!("message from '{}' resolved to no recipients, dropped", sender_name);
    }

    Ok(Delivery {
        recipients,
        payload: Message {
            sender: sender_name,
            body: body.to_string(),
            timestamp,
            scope,
        },
    })
}

/// Look up the sender's display name, failing if it was never set.
pub(crate) fn resolve_sender_name(
    registry: &Registry,
    sender: ConnectionId,
) -> Result<String, RelayError> {
    let session = registry
        .get(sender)
        .ok_or(RelayError::UnknownConnection(sender))?;
    session.display_name.clone().ok_or(RelayError::NotJoined)
}

/// Recipient set for a scope, sender included where membership says so.
pub(crate) fn resolve_recipients(
    registry: &Registry,
    rooms: &RoomIndex,
    sender: ConnectionId,
    scope: &Scope,
) -> Vec<ConnectionId> {
    match scope {
        Scope::Private(target) => match registry.lookup_by_name(target) {
            Some(recipient) => {
                let mut recipients = vec![recipient, sender];
                recipients.sort();
                recipients.dedup();
                recipients
            }
            // Offline or unknown target: defined no-op, not an error.
            None => Vec::new(),
        },
        Scope::Room(room) => rooms.members_of(room),
        Scope::Public => registry.connection_ids(),
    }
}
