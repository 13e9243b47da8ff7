//! Persist-then-notify producers.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info};

use socialhub_core::config::NotificationConfig;
use socialhub_core::error::AppError;
use socialhub_core::types::{MessageId, StoryId, UserId};
use socialhub_database::NotificationStore;
use socialhub_entity::{
    ChatMessage, ChatRef, CommentRef, NewNotification, NotificationKind, PostRef, UserSummary,
};
use socialhub_realtime::{Notifier, OutboundEvent};

use super::report::DeliveryReport;

/// Turns persisted domain facts into stored notifications and live events.
///
/// A notification that fails to persist is never pushed, so a client never
/// sees a live notification that a reload cannot find.
#[derive(Clone)]
pub struct NotificationProducer {
    /// Notification persistence.
    store: Arc<dyn NotificationStore>,
    /// Live delivery.
    notifier: Arc<dyn Notifier>,
    /// Fan-out and preview limits.
    config: NotificationConfig,
}

impl std::fmt::Debug for NotificationProducer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationProducer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl NotificationProducer {
    /// Creates a new producer.
    pub fn new(
        store: Arc<dyn NotificationStore>,
        notifier: Arc<dyn Notifier>,
        config: NotificationConfig,
    ) -> Self {
        Self {
            store,
            notifier,
            config,
        }
    }

    /// `actor` liked `post`. Self-likes are skipped.
    pub async fn post_liked(&self, actor: &UserSummary, post: &PostRef) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        if post.author_id == actor.id {
            report.skipped += 1;
            return report;
        }

        let mut new =
            NewNotification::new(post.author_id.clone(), actor.clone(), NotificationKind::Like);
        new.post = Some(post.id.clone());
        new.link = Some(format!("/post/{}", post.id));

        self.persist_and_push(&mut report, new).await;
        report
    }

    /// `actor` commented on `post`, or replied to a comment on it.
    ///
    /// The post author gets `comment` (or `reply`) unless they wrote it.
    /// For a reply, the parent comment's author also gets `reply` when they
    /// are neither the actor nor the post author.
    pub async fn post_commented(
        &self,
        actor: &UserSummary,
        post: &PostRef,
        comment: &CommentRef,
    ) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        let kind = if comment.is_reply() {
            NotificationKind::Reply
        } else {
            NotificationKind::Comment
        };

        let mut recipients = vec![(&post.author_id, kind)];
        let parent_author = comment.parent_author.as_ref().filter(|_| comment.is_reply());
        if let Some(parent_author) = parent_author {
            if parent_author != &post.author_id {
                recipients.push((parent_author, NotificationKind::Reply));
            }
        }

        for (recipient, kind) in recipients {
            if recipient == &actor.id {
                report.skipped += 1;
                continue;
            }
            let mut new = NewNotification::new(recipient.clone(), actor.clone(), kind);
            new.post = Some(post.id.clone());
            new.comment = Some(comment.id.clone());
            new.link = Some(format!("/post/{}", post.id));

            self.persist_and_push(&mut report, new).await;
        }
        report
    }

    /// `actor` reposted `original`. Reposting one's own post is skipped.
    pub async fn post_shared(&self, actor: &UserSummary, original: &PostRef) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        if original.author_id == actor.id {
            report.skipped += 1;
            return report;
        }

        let mut new =
            NewNotification::new(original.author_id.clone(), actor.clone(), NotificationKind::Post);
        new.post = Some(original.id.clone());
        new.link = Some(format!("/post/{}", original.id));

        self.persist_and_push(&mut report, new).await;
        report
    }

    /// `actor` followed `target`.
    pub async fn user_followed(&self, actor: &UserSummary, target: &UserId) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        if target == &actor.id {
            report.skipped += 1;
            return report;
        }

        let mut new = NewNotification::new(target.clone(), actor.clone(), NotificationKind::Follow);
        new.link = Some(format!("/profile/{}", actor.id));

        self.persist_and_push(&mut report, new).await;
        report
    }

    /// `actor` posted a story. Only the first `story_fanout_limit`
    /// followers are notified; a failure for one does not stop the rest.
    pub async fn story_created(
        &self,
        actor: &UserSummary,
        story_id: &StoryId,
        followers: &[UserId],
    ) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        let limit = self.config.story_fanout_limit;
        if followers.len() > limit {
            debug!(
                user_id = %actor.id,
                followers = followers.len(),
                limit,
                "Story fan-out truncated"
            );
        }

        for follower in followers.iter().take(limit) {
            let mut new =
                NewNotification::new(follower.clone(), actor.clone(), NotificationKind::Story);
            new.story = Some(story_id.clone());
            new.link = Some(format!("/stories/{}", actor.id));

            self.persist_and_push(&mut report, new).await;
        }

        info!(
            user_id = %actor.id,
            story_id = %story_id,
            persisted = report.persisted,
            failures = report.failures.len(),
            "Story notifications sent"
        );
        report
    }

    /// A chat message was persisted. Every participant but the sender gets a
    /// `message` notification and a `newMessage` event.
    pub async fn message_sent(&self, chat: &ChatRef, message: &ChatMessage) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        let sender = &message.sender;

        let payload = match serde_json::to_value(message) {
            Ok(payload) => payload,
            Err(e) => {
                let e = AppError::from(e);
                error!(chat_id = %chat.id, error = %e, "Failed to serialize chat message");
                for recipient in chat.others(&sender.id) {
                    report.fail(recipient, e.clone());
                }
                return report;
            }
        };
        let preview: String = message
            .content
            .chars()
            .take(self.config.preview_length)
            .collect();

        for participant in &chat.participants {
            if participant == &sender.id {
                report.skipped += 1;
                continue;
            }

            let mut new =
                NewNotification::new(participant.clone(), sender.clone(), NotificationKind::Message);
            new.chat = Some(chat.id.clone());
            new.content = Some(preview.clone());
            new.link = Some(format!("/chats/{}", chat.id));

            if self.persist_and_push(&mut report, new).await {
                let reached = self.notifier.deliver_to_user(
                    participant,
                    OutboundEvent::NewMessage {
                        chat_id: chat.id.clone(),
                        message: payload.clone(),
                    },
                );
                report.sessions_reached += reached;
                debug!(user_id = %participant, chat_id = %chat.id, reached, "newMessage pushed");
            }
        }

        report
    }

    /// A chat message was deleted. Every participant, sender included, gets
    /// `messageDeleted`. Nothing is persisted.
    pub fn message_deleted(&self, chat: &ChatRef, message_id: &MessageId) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        for participant in &chat.participants {
            report.sessions_reached += self.notifier.deliver_to_user(
                participant,
                OutboundEvent::MessageDeleted {
                    chat_id: chat.id.clone(),
                    message_id: message_id.clone(),
                },
            );
        }
        report
    }

    /// Stores `new` and pushes the stored document as `newNotification`.
    /// Returns whether it was persisted.
    async fn persist_and_push(&self, report: &mut DeliveryReport, new: NewNotification) -> bool {
        let recipient = new.recipient.clone();
        let kind = new.kind;

        let stored = match self.store.create(new).await {
            Ok(stored) => stored,
            Err(e) => {
                error!(
                    recipient = %recipient,
                    kind = kind.as_str(),
                    error = %e,
                    "Failed to persist notification"
                );
                report.fail(&recipient, e);
                return false;
            }
        };
        report.persisted += 1;

        let payload: Value = match serde_json::to_value(&stored) {
            Ok(payload) => payload,
            Err(e) => {
                let e = AppError::from(e);
                error!(recipient = %recipient, error = %e, "Failed to serialize notification");
                report.fail(&recipient, e);
                return true;
            }
        };

        let reached = self
            .notifier
            .deliver_to_user(&recipient, OutboundEvent::NewNotification(payload));
        report.sessions_reached += reached;
        debug!(
            recipient = %recipient,
            kind = kind.as_str(),
            reached,
            "Notification delivered"
        );
        true
    }
}
