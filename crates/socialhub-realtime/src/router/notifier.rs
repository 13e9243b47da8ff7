//! Delivery seam injected into producers.

use socialhub_core::types::{ChatId, UserId};

use crate::message::types::OutboundEvent;

/// Pushes events to live sessions.
///
/// Producers hold an `Arc<dyn Notifier>` instead of reaching for a global
/// router, so they can be exercised against a recording double.
pub trait Notifier: Send + Sync {
    /// Emit to the personal room of `user_id`. Returns the number of
    /// sessions reached; zero means the user is offline and the event was
    /// dropped.
    fn deliver_to_user(&self, user_id: &UserId, event: OutboundEvent) -> usize;

    /// Emit to every session in the room of `chat_id`.
    fn deliver_to_chat(&self, chat_id: &ChatId, event: OutboundEvent) -> usize;
}
