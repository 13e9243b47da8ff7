//! References to persisted posts and comments.

use serde::{Deserialize, Serialize};

use socialhub_core::types::{CommentId, PostId, UserId};

/// A persisted post, as much of it as a like/comment notification needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostRef {
    /// Post ID.
    #[serde(rename = "_id")]
    pub id: PostId,
    /// Author; the notification recipient.
    #[serde(skip_serializing)]
    pub author_id: UserId,
    /// Post text.
    #[serde(default)]
    pub content: String,
}

/// A persisted comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRef {
    /// Comment ID.
    #[serde(rename = "_id")]
    pub id: CommentId,
    /// Comment text.
    pub content: String,
    /// Comment this one replies to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<CommentId>,
    /// Author of `parent`, when known.
    #[serde(default, skip_serializing)]
    pub parent_author: Option<UserId>,
}

impl CommentRef {
    /// Whether this comment replies to another comment.
    pub fn is_reply(&self) -> bool {
        self.parent.is_some()
    }
}
