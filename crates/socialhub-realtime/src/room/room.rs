//! Single room with its member sessions.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use socialhub_core::types::SessionId;

use super::key::RoomKey;

/// A room and the sessions currently in it.
#[derive(Debug, Clone)]
pub struct Room {
    /// Room key.
    pub key: RoomKey,
    /// Member sessions.
    pub members: HashSet<SessionId>,
    /// When the first member joined.
    pub created_at: DateTime<Utc>,
}

impl Room {
    /// Creates a new empty room.
    pub fn new(key: RoomKey) -> Self {
        Self {
            key,
            members: HashSet::new(),
            created_at: Utc::now(),
        }
    }

    /// Adds a member. Returns `false` if it was already present.
    pub fn join(&mut self, session_id: SessionId) -> bool {
        self.members.insert(session_id)
    }

    /// Removes a member.
    pub fn leave(&mut self, session_id: SessionId) -> bool {
        self.members.remove(&session_id)
    }

    /// Returns member count.
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Returns whether the room has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
