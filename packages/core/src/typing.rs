//! Typing broadcaster: routes ephemeral typing indicators.
//!
//! Resolution mirrors the message router with one difference: you never
//! receive your own typing indicator. Room and public scopes exclude the
//! sender, and a private indicator goes to the named target only (no echo
//! back to the sender).

use crate::error::RelayError;
use crate::message::{Delivery, Scope, TypingIntent, TypingNotice};
use crate::rooms::RoomIndex;
use crate::router::{resolve_recipients, resolve_sender_name};
use crate::session::{ConnectionId, Registry};

/// Resolve a typing intent to a [`TypingNotice`] and its recipients.
///
/// Same precedence and name resolution as the message router; an
/// unresolvable private target drops the notice silently. Typing events
/// carry no timestamp, they are transient UI hints.
pub fn notify_typing(
    registry: &Registry,
    rooms: &RoomIndex,
    sender: ConnectionId,
    intent: TypingIntent,
) -> Result<Delivery<TypingNotice>, RelayError> {
    let sender_name = resolve_sender_name(registry, sender)?;

    let scope = Scope::from_discriminators(intent.to.as_deref(), intent.room.as_deref());
    let mut recipients = resolve_recipients(registry, rooms, sender, &scope);
    recipients.retain(|id| *id != sender);

    Ok(Delivery {
        recipients,
        payload: TypingNotice {
            user: sender_name,
            is_typing: intent.is_typing,
        },
    })
}
