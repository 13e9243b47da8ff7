//! Notification document model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use socialhub_core::types::{ChatId, CommentId, NotificationId, PostId, StoryId, UserId};

use crate::user::UserSummary;

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// Someone followed the recipient.
    Follow,
    /// Someone unfollowed the recipient.
    Unfollow,
    /// Someone liked the recipient's post.
    Like,
    /// Someone commented on the recipient's post.
    Comment,
    /// Someone replied to the recipient's comment.
    Reply,
    /// Someone mentioned the recipient.
    Mention,
    /// Someone sent the recipient a chat message.
    Message,
    /// Someone the recipient follows posted a story.
    Story,
    /// Someone shared the recipient's post.
    Post,
}

impl NotificationKind {
    /// Storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Follow => "follow",
            Self::Unfollow => "unfollow",
            Self::Like => "like",
            Self::Comment => "comment",
            Self::Reply => "reply",
            Self::Mention => "mention",
            Self::Message => "message",
            Self::Story => "story",
            Self::Post => "post",
        }
    }

    /// Parses the storage representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "follow" => Some(Self::Follow),
            "unfollow" => Some(Self::Unfollow),
            "like" => Some(Self::Like),
            "comment" => Some(Self::Comment),
            "reply" => Some(Self::Reply),
            "mention" => Some(Self::Mention),
            "message" => Some(Self::Message),
            "story" => Some(Self::Story),
            "post" => Some(Self::Post),
            _ => None,
        }
    }
}

/// A stored notification with its sender populated.
///
/// This is the `newNotification` payload: it carries enough to render
/// without another request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Notification ID.
    #[serde(rename = "_id")]
    pub id: NotificationId,
    /// Recipient.
    pub recipient: UserId,
    /// Actor, populated.
    pub sender: UserSummary,
    /// Kind.
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    /// Related post.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<PostId>,
    /// Related comment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<CommentId>,
    /// Related chat.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat: Option<ChatId>,
    /// Related story.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub story: Option<StoryId>,
    /// Short text preview.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Whether the recipient has read it.
    pub is_read: bool,
    /// Client route to open.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Input for creating a notification.
#[derive(Debug, Clone)]
pub struct NewNotification {
    /// Recipient.
    pub recipient: UserId,
    /// Actor, already populated by the producer.
    pub sender: UserSummary,
    /// Kind.
    pub kind: NotificationKind,
    /// Related post.
    pub post: Option<PostId>,
    /// Related comment.
    pub comment: Option<CommentId>,
    /// Related chat.
    pub chat: Option<ChatId>,
    /// Related story.
    pub story: Option<StoryId>,
    /// Short text preview.
    pub content: Option<String>,
    /// Client route to open.
    pub link: Option<String>,
}

impl NewNotification {
    /// A notification with no related resources yet.
    pub fn new(recipient: UserId, sender: UserSummary, kind: NotificationKind) -> Self {
        Self {
            recipient,
            sender,
            kind,
            post: None,
            comment: None,
            chat: None,
            story: None,
            content: None,
            link: None,
        }
    }

    /// Materialize with a store-assigned id and timestamp.
    pub fn into_notification(self, id: NotificationId, created_at: DateTime<Utc>) -> Notification {
        Notification {
            id,
            recipient: self.recipient,
            sender: self.sender,
            kind: self.kind,
            post: self.post,
            comment: self.comment,
            chat: self.chat,
            story: self.story,
            content: self.content,
            is_read: false,
            link: self.link,
            created_at,
        }
    }
}
