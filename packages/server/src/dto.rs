//! Wire DTOs and conversions between wire events and core types.
//!
//! Inbound and outbound payloads keep the field names the reference
//! clients expect (`isTyping`, `private`); everything between the wire
//! and the core goes through the conversions below.

use relay_core::{Action, Event, Message, MessageIntent, Scope, TypingIntent};
use serde::{Deserialize, Serialize};

/// Inbound wire event from a client.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    SetUsername {
        name: String,
    },
    JoinRoom {
        room: String,
    },
    SendMessage {
        body: String,
        #[serde(default)]
        to: Option<String>,
        #[serde(default)]
        room: Option<String>,
    },
    Typing {
        #[serde(rename = "isTyping")]
        is_typing: bool,
        #[serde(default)]
        to: Option<String>,
        #[serde(default)]
        room: Option<String>,
    },
}

/// Outbound wire event to a client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    ReceiveMessage {
        user: String,
        body: String,
        timestamp: i64,
        #[serde(skip_serializing_if = "Option::is_none")]
        room: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        to: Option<String>,
        #[serde(skip_serializing_if = "is_false")]
        private: bool,
    },
    UserTyping {
        user: String,
        #[serde(rename = "isTyping")]
        is_typing: bool,
    },
    OnlineUsers {
        users: Vec<String>,
    },
    UserJoined {
        user: String,
    },
    UserLeft {
        user: String,
    },
    /// Delivered only to the connection whose action failed.
    Error {
        message: String,
    },
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl From<ClientEvent> for Action {
    fn from(event: ClientEvent) -> Self {
        match event {
            ClientEvent::SetUsername { name } => Action::SetUsername { name },
            ClientEvent::JoinRoom { room } => Action::JoinRoom { room },
            ClientEvent::SendMessage { body, to, room } => {
                Action::SendMessage(MessageIntent { body, to, room })
            }
            ClientEvent::Typing { is_typing, to, room } => {
                Action::Typing(TypingIntent { is_typing, to, room })
            }
        }
    }
}

impl From<Event> for ServerEvent {
    fn from(event: Event) -> Self {
        match event {
            Event::ReceiveMessage(message) => message.into(),
            Event::UserTyping(notice) => ServerEvent::UserTyping {
                user: notice.user,
                is_typing: notice.is_typing,
            },
            Event::OnlineUsers(users) => ServerEvent::OnlineUsers { users },
            Event::UserJoined { user } => ServerEvent::UserJoined { user },
            Event::UserLeft { user } => ServerEvent::UserLeft { user },
        }
    }
}

impl From<Message> for ServerEvent {
    fn from(message: Message) -> Self {
        let (room, to, private) = match message.scope {
            Scope::Public => (None, None, false),
            Scope::Room(room) => (Some(room), None, false),
            Scope::Private(to) => (None, Some(to), true),
        };
        ServerEvent::ReceiveMessage {
            user: message.sender,
            body: message.body,
            timestamp: message.timestamp,
            room,
            to,
            private,
        }
    }
}
