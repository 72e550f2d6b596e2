//! Session, presence and routing core for the chat relay.
//!
//! This crate owns all mutable connection state (who is connected, what
//! they are called, which room they are in) and resolves every inbound
//! event to the set of connections it must be delivered to. It knows
//! nothing about WebSockets or JSON: the transport layer feeds it
//! [`Action`]s and delivers the [`Outbound`] events it returns.

pub mod error;
pub mod message;
pub mod presence;
pub mod relay;
pub mod rooms;
pub mod router;
pub mod session;
pub mod time;
pub mod typing;

pub use error::RelayError;
pub use message::{Delivery, Message, MessageIntent, Scope, TypingIntent, TypingNotice};
pub use relay::{Action, Event, Outbound, RelayState};
pub use rooms::RoomIndex;
pub use session::{ConnectionId, Registry, Session};
pub use time::{Clock, FixedClock, SystemClock};
