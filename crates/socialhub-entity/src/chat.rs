//! Chat messages and the chat they belong to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use socialhub_core::types::{ChatId, MessageId, UserId};

use crate::user::UserSummary;

/// Kind of chat message body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    /// Plain text.
    #[default]
    Text,
    /// Image attachment.
    Image,
    /// Video attachment.
    Video,
    /// Audio attachment.
    Audio,
    /// Generic file attachment.
    File,
}

/// A persisted chat message with its sender populated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Message ID.
    #[serde(rename = "_id")]
    pub id: MessageId,
    /// Owning chat.
    #[serde(rename = "chat")]
    pub chat_id: ChatId,
    /// Sender, populated.
    pub sender: UserSummary,
    /// Text body; may be empty for media messages.
    #[serde(default)]
    pub content: String,
    /// Body kind.
    #[serde(default)]
    pub message_type: MessageType,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// A chat and its participants, used to resolve recipients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRef {
    /// Chat ID.
    #[serde(rename = "_id")]
    pub id: ChatId,
    /// Every participant, sender included.
    pub participants: Vec<UserId>,
}

impl ChatRef {
    /// Participants other than `user_id`.
    pub fn others<'a>(&'a self, user_id: &'a UserId) -> impl Iterator<Item = &'a UserId> + 'a {
        self.participants.iter().filter(move |p| *p != user_id)
    }
}
