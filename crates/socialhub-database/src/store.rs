//! Storage traits implemented by the PostgreSQL and in-memory backends.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use socialhub_core::result::AppResult;
use socialhub_core::types::UserId;
use socialhub_entity::{NewNotification, Notification};

/// One presence write, stamped with the per-user version it was issued at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceRecord {
    /// User whose record is updated.
    pub user_id: UserId,
    /// Online flag.
    pub is_online: bool,
    /// Time of the transition.
    pub last_seen: DateTime<Utc>,
    /// Monotonic per user; a store never lets a lower version overwrite a higher one.
    pub version: u64,
}

/// Durable presence columns on the user record.
#[async_trait]
pub trait PresenceStore: Send + Sync + 'static {
    /// Write `record` unless a record with an equal or newer version is
    /// already stored. Returns `false` when the write was discarded.
    async fn save_presence(&self, record: &PresenceRecord) -> AppResult<bool>;

    /// Read the stored presence for a user.
    async fn load_presence(&self, user_id: &UserId) -> AppResult<Option<PresenceRecord>>;

    /// Flip every user still flagged online to offline. Run at startup:
    /// no session survives a restart. Returns the number of users changed.
    async fn reset_online(&self) -> AppResult<u64>;
}

/// Durable notification documents.
#[async_trait]
pub trait NotificationStore: Send + Sync + 'static {
    /// Persist a notification and return it with id and timestamp assigned.
    async fn create(&self, notification: NewNotification) -> AppResult<Notification>;
}
