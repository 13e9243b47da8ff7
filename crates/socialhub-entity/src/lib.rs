//! # socialhub-entity
//!
//! Domain models handed from the REST layer to the delivery producers and
//! pushed to clients: user summaries, notifications, chat messages, and the
//! post/comment/chat references producers need to resolve recipients.
//!
//! Documents keep the `_id` field name clients already read.

pub mod chat;
pub mod notification;
pub mod post;
pub mod user;

pub use chat::{ChatMessage, ChatRef, MessageType};
pub use notification::{NewNotification, Notification, NotificationKind};
pub use post::{CommentRef, PostRef};
pub use user::UserSummary;
