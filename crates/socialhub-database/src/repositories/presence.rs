//! Presence columns of the `users` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use socialhub_core::error::{AppError, ErrorKind};
use socialhub_core::result::AppResult;
use socialhub_core::types::UserId;

use crate::store::{PresenceRecord, PresenceStore};

#[derive(Debug, FromRow)]
struct PresenceRow {
    id: String,
    is_online: bool,
    last_seen: DateTime<Utc>,
    presence_version: i64,
}

/// Repository for the presence columns on user records.
#[derive(Debug, Clone)]
pub struct PresenceRepository {
    pool: PgPool,
}

impl PresenceRepository {
    /// Create a new presence repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PresenceStore for PresenceRepository {
    async fn save_presence(&self, record: &PresenceRecord) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET is_online = $2, last_seen = $3, presence_version = $4, updated_at = NOW() \
             WHERE id = $1 AND presence_version < $4",
        )
        .bind(record.user_id.as_str())
        .bind(record.is_online)
        .bind(record.last_seen)
        .bind(record.version as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to save presence", e))?;

        Ok(result.rows_affected() == 1)
    }

    async fn load_presence(&self, user_id: &UserId) -> AppResult<Option<PresenceRecord>> {
        let row = sqlx::query_as::<_, PresenceRow>(
            "SELECT id, is_online, last_seen, presence_version FROM users WHERE id = $1",
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load presence", e))?;

        row.map(|r| {
            Ok(PresenceRecord {
                user_id: UserId::parse(r.id)?,
                is_online: r.is_online,
                last_seen: r.last_seen,
                version: r.presence_version.max(0) as u64,
            })
        })
        .transpose()
    }

    async fn reset_online(&self) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE users SET is_online = FALSE, last_seen = NOW(), updated_at = NOW() WHERE is_online",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to reset presence", e))?;

        Ok(result.rows_affected())
    }
}
