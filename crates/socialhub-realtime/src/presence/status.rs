//! Presence state types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use socialhub_core::types::UserId;

use crate::message::types::OutboundEvent;

/// User presence status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    /// At least one joined session.
    Online,
    /// No joined session.
    Offline,
}

impl PresenceStatus {
    /// Returns the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
        }
    }

    /// Status for an online flag.
    pub fn from_online(is_online: bool) -> Self {
        if is_online { Self::Online } else { Self::Offline }
    }
}

/// In-memory presence of one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceState {
    /// User ID.
    pub user_id: UserId,
    /// Whether the user has at least one joined session.
    pub is_online: bool,
    /// Time of the latest transition.
    pub last_seen: DateTime<Utc>,
    /// Version of the latest transition.
    pub version: u64,
}

impl PresenceState {
    /// A user that has never been seen by this process.
    pub fn offline(user_id: UserId) -> Self {
        Self {
            user_id,
            is_online: false,
            last_seen: Utc::now(),
            version: 0,
        }
    }

    /// Current status.
    pub fn status(&self) -> PresenceStatus {
        PresenceStatus::from_online(self.is_online)
    }
}

/// A real online/offline transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceChange {
    /// User whose presence changed.
    pub user_id: UserId,
    /// New status.
    pub status: PresenceStatus,
    /// Transition time.
    pub last_seen: DateTime<Utc>,
    /// Version stamped on the persisted record.
    pub version: u64,
}

impl From<&PresenceChange> for OutboundEvent {
    fn from(change: &PresenceChange) -> Self {
        OutboundEvent::UserStatusChange {
            user_id: change.user_id.clone(),
            status: change.status,
            last_seen: match change.status {
                PresenceStatus::Online => None,
                PresenceStatus::Offline => Some(change.last_seen),
            },
        }
    }
}
