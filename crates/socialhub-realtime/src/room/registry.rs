//! Room registry: manages all rooms and memberships.

use std::collections::HashSet;

use dashmap::DashMap;
use tracing::debug;

use socialhub_core::types::SessionId;

use super::key::RoomKey;
use super::membership::MembershipIndex;
use super::room::Room;

/// Registry of all non-empty rooms.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    /// Room key → room.
    rooms: DashMap<RoomKey, Room>,
    /// Reverse index.
    memberships: MembershipIndex,
}

impl RoomRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a session to a room. Joining twice is a no-op; returns whether
    /// the session was newly added.
    pub fn join(&self, key: RoomKey, session_id: SessionId) -> bool {
        let added = self
            .rooms
            .entry(key.clone())
            .or_insert_with(|| Room::new(key.clone()))
            .join(session_id);

        if added {
            debug!(session_id = %session_id, room = %key, "Joined room");
            self.memberships.add(session_id, key);
        }
        added
    }

    /// Removes a session from a room. Empty rooms are dropped.
    pub fn leave(&self, key: &RoomKey, session_id: SessionId) -> bool {
        let removed = self.leave_room(key, session_id);
        self.memberships.remove(session_id, key);
        if removed {
            debug!(session_id = %session_id, room = %key, "Left room");
        }
        removed
    }

    /// Removes a session from every room it is in.
    pub fn leave_all(&self, session_id: SessionId) -> usize {
        let rooms = self.memberships.remove_all(session_id);
        for key in &rooms {
            self.leave_room(key, session_id);
        }
        if !rooms.is_empty() {
            debug!(session_id = %session_id, rooms = rooms.len(), "Left all rooms");
        }
        rooms.len()
    }

    fn leave_room(&self, key: &RoomKey, session_id: SessionId) -> bool {
        let mut removed = false;
        self.rooms.remove_if_mut(key, |_, room| {
            removed = room.leave(session_id);
            room.is_empty()
        });
        removed
    }

    /// Sessions currently in a room.
    pub fn members(&self, key: &RoomKey) -> Vec<SessionId> {
        self.rooms
            .get(key)
            .map(|room| room.members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Whether a session is in a room.
    pub fn is_member(&self, key: &RoomKey, session_id: SessionId) -> bool {
        self.rooms
            .get(key)
            .map(|room| room.members.contains(&session_id))
            .unwrap_or(false)
    }

    /// Rooms a session is in.
    pub fn rooms_of(&self, session_id: SessionId) -> HashSet<RoomKey> {
        self.memberships.rooms_of(session_id)
    }

    /// Number of chat rooms a session is in.
    pub fn chat_room_count(&self, session_id: SessionId) -> usize {
        self.memberships.chat_room_count(session_id)
    }

    /// Number of members in a room.
    pub fn member_count(&self, key: &RoomKey) -> usize {
        self.rooms.get(key).map(|room| room.member_count()).unwrap_or(0)
    }

    /// Number of non-empty rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
