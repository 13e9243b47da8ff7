//! In-memory notification store.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use socialhub_core::error::AppError;
use socialhub_core::result::AppResult;
use socialhub_core::types::{NotificationId, UserId};
use socialhub_entity::{NewNotification, Notification};

use crate::store::NotificationStore;

/// Append-only notification list.
#[derive(Debug, Default)]
pub struct MemoryNotificationStore {
    notifications: RwLock<Vec<Notification>>,
    failing_recipients: RwLock<HashSet<UserId>>,
}

impl MemoryNotificationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make writes for `recipient` fail.
    pub async fn fail_for(&self, recipient: UserId) {
        self.failing_recipients.write().await.insert(recipient);
    }

    /// Every stored notification, oldest first.
    pub async fn all(&self) -> Vec<Notification> {
        self.notifications.read().await.clone()
    }

    /// Notifications addressed to `recipient`, oldest first.
    pub async fn for_recipient(&self, recipient: &UserId) -> Vec<Notification> {
        self.notifications
            .read()
            .await
            .iter()
            .filter(|n| &n.recipient == recipient)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl NotificationStore for MemoryNotificationStore {
    async fn create(&self, notification: NewNotification) -> AppResult<Notification> {
        if self
            .failing_recipients
            .read()
            .await
            .contains(&notification.recipient)
        {
            return Err(AppError::database(format!(
                "notification store rejected write for {}",
                notification.recipient
            )));
        }

        let id = NotificationId::parse(Uuid::new_v4().simple().to_string())?;
        let stored = notification.into_notification(id, Utc::now());
        self.notifications.write().await.push(stored.clone());
        Ok(stored)
    }
}
