//! Shared value types.

pub mod id;

pub use id::{ChatId, CommentId, MessageId, NotificationId, PostId, SessionId, StoryId, UserId};
