//! Session → rooms reverse index.

use std::collections::HashSet;

use dashmap::DashMap;

use socialhub_core::types::SessionId;

use super::key::RoomKey;

/// Tracks which rooms each session is in, so a disconnect can leave all
/// of them without scanning every room.
#[derive(Debug, Default)]
pub struct MembershipIndex {
    /// Session ID → rooms.
    by_session: DashMap<SessionId, HashSet<RoomKey>>,
}

impl MembershipIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a membership.
    pub fn add(&self, session_id: SessionId, key: RoomKey) {
        self.by_session.entry(session_id).or_default().insert(key);
    }

    /// Removes a membership.
    pub fn remove(&self, session_id: SessionId, key: &RoomKey) {
        self.by_session
            .remove_if_mut(&session_id, |_, rooms| {
                rooms.remove(key);
                rooms.is_empty()
            });
    }

    /// Rooms a session is in.
    pub fn rooms_of(&self, session_id: SessionId) -> HashSet<RoomKey> {
        self.by_session
            .get(&session_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Number of chat rooms a session is in.
    pub fn chat_room_count(&self, session_id: SessionId) -> usize {
        self.by_session
            .get(&session_id)
            .map(|entry| entry.iter().filter(|k| k.is_chat()).count())
            .unwrap_or(0)
    }

    /// Forgets a session entirely, returning the rooms it was in.
    pub fn remove_all(&self, session_id: SessionId) -> HashSet<RoomKey> {
        self.by_session
            .remove(&session_id)
            .map(|(_, rooms)| rooms)
            .unwrap_or_default()
    }
}
