//! In-memory presence store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use socialhub_core::error::AppError;
use socialhub_core::result::AppResult;
use socialhub_core::types::UserId;

use crate::store::{PresenceRecord, PresenceStore};

/// Presence records keyed by user, with the same version guard as the
/// PostgreSQL repository.
#[derive(Debug, Default)]
pub struct MemoryPresenceStore {
    records: RwLock<HashMap<UserId, PresenceRecord>>,
    failing: AtomicBool,
}

impl MemoryPresenceStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of users with a stored record.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether nothing has been stored.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl PresenceStore for MemoryPresenceStore {
    async fn save_presence(&self, record: &PresenceRecord) -> AppResult<bool> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::database("presence store unavailable"));
        }

        let mut records = self.records.write().await;
        match records.get(&record.user_id) {
            Some(stored) if stored.version >= record.version => Ok(false),
            _ => {
                records.insert(record.user_id.clone(), record.clone());
                Ok(true)
            }
        }
    }

    async fn load_presence(&self, user_id: &UserId) -> AppResult<Option<PresenceRecord>> {
        Ok(self.records.read().await.get(user_id).cloned())
    }

    async fn reset_online(&self) -> AppResult<u64> {
        let now = Utc::now();
        let mut changed = 0;
        for record in self.records.write().await.values_mut() {
            if record.is_online {
                record.is_online = false;
                record.last_seen = now;
                changed += 1;
            }
        }
        Ok(changed)
    }
}
