//! Typed room keys.
//!
//! The two namespaces are distinct enum variants, so a user id and a chat
//! id that happen to be equal strings never address the same room.

use std::fmt;

use serde::{Deserialize, Serialize};

use socialhub_core::types::{ChatId, UserId};

/// Identifier of a room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum RoomKey {
    /// Personal room of one user, `user:<id>`.
    User(UserId),
    /// Chat room, `chat:<id>`.
    Chat(ChatId),
}

/// Personal room of a user.
pub fn room_for_user(user_id: &UserId) -> RoomKey {
    RoomKey::User(user_id.clone())
}

/// Room of a chat.
pub fn room_for_chat(chat_id: &ChatId) -> RoomKey {
    RoomKey::Chat(chat_id.clone())
}

impl RoomKey {
    /// Whether this is a chat room.
    pub fn is_chat(&self) -> bool {
        matches!(self, Self::Chat(_))
    }
}

impl fmt::Display for RoomKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(id) => write!(f, "user:{id}"),
            Self::Chat(id) => write!(f, "chat:{id}"),
        }
    }
}
