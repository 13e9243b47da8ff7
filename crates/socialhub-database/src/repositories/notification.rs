//! Notification repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use socialhub_core::error::{AppError, ErrorKind};
use socialhub_core::result::AppResult;
use socialhub_core::types::NotificationId;
use socialhub_entity::{NewNotification, Notification};

use crate::store::NotificationStore;

/// Repository for notification documents.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    /// Create a new notification repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationStore for NotificationRepository {
    async fn create(&self, notification: NewNotification) -> AppResult<Notification> {
        let id = NotificationId::parse(Uuid::new_v4().simple().to_string())?;

        let created_at: DateTime<Utc> = sqlx::query_scalar(
            "INSERT INTO notifications \
             (id, recipient_id, sender_id, kind, post_id, comment_id, chat_id, story_id, content, link) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING created_at",
        )
        .bind(id.as_str())
        .bind(notification.recipient.as_str())
        .bind(notification.sender.id.as_str())
        .bind(notification.kind.as_str())
        .bind(notification.post.as_ref().map(|p| p.as_str()))
        .bind(notification.comment.as_ref().map(|c| c.as_str()))
        .bind(notification.chat.as_ref().map(|c| c.as_str()))
        .bind(notification.story.as_ref().map(|s| s.as_str()))
        .bind(notification.content.as_deref())
        .bind(notification.link.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to create notification", e)
        })?;

        Ok(notification.into_notification(id, created_at))
    }
}
