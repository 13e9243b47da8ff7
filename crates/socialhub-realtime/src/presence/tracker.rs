//! Presence tracker: owns per-user online state and queues persistence.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use socialhub_core::types::UserId;
use socialhub_database::PresenceRecord;

use super::status::{PresenceChange, PresenceState, PresenceStatus};

/// Tracks presence for users seen by this process.
///
/// An offline entry is evicted once the writer has stored its record, so
/// the map holds online users plus offline ones still waiting to be
/// persisted (or whose write failed). Readers fall back to the store.
///
/// Transitions are only requested by the connection registry on a true
/// zero-crossing, while it holds that user's entry. A same-direction
/// request is still answered with `None` so a caller bug cannot produce a
/// duplicate broadcast.
#[derive(Debug)]
pub struct PresenceTracker {
    /// User ID → presence.
    states: DashMap<UserId, PresenceState>,
    /// Persistence queue drained by the presence writer.
    writer: mpsc::UnboundedSender<PresenceRecord>,
    /// Next version to stamp. Seeded from the wall clock in microseconds so
    /// versions keep increasing across restarts.
    next_version: AtomicU64,
}

impl PresenceTracker {
    /// Creates a tracker and the receiving end of its persistence queue.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<PresenceRecord>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let seed = Utc::now().timestamp_micros().max(1) as u64;
        let tracker = Self {
            states: DashMap::new(),
            writer: tx,
            next_version: AtomicU64::new(seed),
        };
        (tracker, rx)
    }

    /// Applies a transition. Returns the change to broadcast, or `None` if
    /// the user was already in the requested state.
    pub fn on_transition(&self, user_id: &UserId, became_online: bool) -> Option<PresenceChange> {
        let mut state = self
            .states
            .entry(user_id.clone())
            .or_insert_with(|| PresenceState::offline(user_id.clone()));

        if state.is_online == became_online {
            debug!(
                user_id = %user_id,
                online = became_online,
                "Ignoring presence transition with no change"
            );
            return None;
        }

        let now = Utc::now();
        let version = self.next_version.fetch_add(1, Ordering::SeqCst);
        state.is_online = became_online;
        state.last_seen = now;
        state.version = version;

        let record = PresenceRecord {
            user_id: user_id.clone(),
            is_online: became_online,
            last_seen: now,
            version,
        };
        // Queued while the entry is held so the queue order matches version order.
        if self.writer.send(record).is_err() {
            warn!(user_id = %user_id, "Presence writer stopped, transition not persisted");
        }
        drop(state);

        Some(PresenceChange {
            user_id: user_id.clone(),
            status: PresenceStatus::from_online(became_online),
            last_seen: now,
            version,
        })
    }

    /// Drops a user's entry if it is still the offline state stamped
    /// `version`. A newer transition keeps it. Returns whether it was removed.
    pub fn evict_offline(&self, user_id: &UserId, version: u64) -> bool {
        let removed = self
            .states
            .remove_if(user_id, |_, state| !state.is_online && state.version == version)
            .is_some();
        if removed {
            debug!(user_id = %user_id, version, "Evicted persisted offline presence");
        }
        removed
    }

    /// Number of users held in memory, online or awaiting eviction.
    pub fn tracked_count(&self) -> usize {
        self.states.len()
    }

    /// Get a user's current presence, if this process still holds it.
    pub fn get(&self, user_id: &UserId) -> Option<PresenceState> {
        self.states.get(user_id).map(|r| r.value().clone())
    }

    /// Check if a user is online.
    pub fn is_online(&self, user_id: &UserId) -> bool {
        self.states
            .get(user_id)
            .map(|r| r.is_online)
            .unwrap_or(false)
    }

    /// All online users.
    pub fn online_users(&self) -> Vec<UserId> {
        self.states
            .iter()
            .filter(|r| r.is_online)
            .map(|r| r.key().clone())
            .collect()
    }

    /// Number of online users.
    pub fn online_count(&self) -> usize {
        self.states.iter().filter(|r| r.is_online).count()
    }
}
