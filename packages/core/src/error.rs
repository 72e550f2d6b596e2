//! Error taxonomy for the relay core.

use thiserror::Error;

use crate::session::ConnectionId;

/// Errors surfaced by relay core operations.
///
/// Every error is local to the connection that caused it; the transport
/// must never broadcast one to other connections. An unresolvable private
/// target is deliberately *not* in this taxonomy: it is a defined no-op
/// (the message is dropped), not a failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// A connection id was registered twice. A sound transport assigns
    /// fresh ids per connection, so this indicates a broken invariant.
    #[error("connection {0} is already registered")]
    DuplicateConnection(ConnectionId),

    /// The acting connection is not in the registry.
    #[error("unknown connection {0}")]
    UnknownConnection(ConnectionId),

    /// Display name was empty or whitespace-only.
    #[error("display name must not be empty")]
    InvalidName,

    /// Room name was empty or whitespace-only.
    #[error("room name must not be empty")]
    InvalidRoom,

    /// Message body was empty or whitespace-only.
    #[error("message body must not be empty")]
    EmptyBody,

    /// The sender tried to send or type before choosing a display name.
    #[error("a display name must be set before sending")]
    NotJoined,
}
