//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use socialhub_core::types::UserId;
use socialhub_database::PresenceRecord;
use socialhub_realtime::metrics::MetricsSnapshot;
use socialhub_realtime::presence::status::{PresenceState, PresenceStatus};

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status.
    pub status: String,
    /// Version.
    pub version: String,
}

/// Detailed health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedHealthResponse {
    /// Overall status.
    pub status: String,
    /// `connected` or `unavailable` for PostgreSQL, else the provider name.
    pub database: String,
    /// Open WebSocket sessions.
    pub ws_sessions: usize,
    /// Users with at least one joined session.
    pub connected_users: usize,
    /// Users the presence tracker holds as online.
    pub online_users: usize,
    /// Engine counters.
    pub metrics: MetricsSnapshot,
}

/// Presence of a single user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceResponse {
    pub user_id: UserId,
    pub status: PresenceStatus,
    pub last_seen: DateTime<Utc>,
}

impl From<PresenceState> for PresenceResponse {
    fn from(state: PresenceState) -> Self {
        Self {
            status: state.status(),
            user_id: state.user_id,
            last_seen: state.last_seen,
        }
    }
}

impl From<PresenceRecord> for PresenceResponse {
    fn from(record: PresenceRecord) -> Self {
        Self {
            status: PresenceStatus::from_online(record.is_online),
            user_id: record.user_id,
            last_seen: record.last_seen,
        }
    }
}

/// Users currently online.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnlineUsersResponse {
    /// Online user ids.
    pub users: Vec<UserId>,
    /// Number of online users.
    pub count: usize,
}
