//! Connection registry: maps users to their live sessions.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use socialhub_core::error::AppError;
use socialhub_core::result::AppResult;
use socialhub_core::types::{SessionId, UserId};

use crate::message::types::OutboundEvent;
use crate::metrics::RealtimeMetrics;
use crate::presence::status::PresenceChange;
use crate::presence::tracker::PresenceTracker;
use crate::room::key::room_for_user;
use crate::room::registry::RoomRegistry;

use super::handle::SessionHandle;

/// Result of a successful join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    /// The session was bound. `presence` is set when this was the user's
    /// first session.
    Joined {
        /// Online transition, already broadcast.
        presence: Option<PresenceChange>,
    },
    /// The session was already bound to this user; nothing changed.
    AlreadyJoined,
}

/// A session removed by [`ConnectionRegistry::on_disconnect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disconnected {
    /// User the session was bound to, if it had joined.
    pub user_id: Option<UserId>,
    /// Offline transition, already broadcast. Set when this was the user's
    /// last session.
    pub presence: Option<PresenceChange>,
}

/// Tracks every session and which user it belongs to.
///
/// Every decision about a user's session count crossing zero is taken while
/// holding that user's `by_user` entry, and the resulting presence change is
/// broadcast before the entry is released. Two transitions of one user
/// therefore reach every session in the order they were decided.
#[derive(Debug)]
pub struct ConnectionRegistry {
    /// Session ID → handle, for every open session.
    by_id: DashMap<SessionId, Arc<SessionHandle>>,
    /// User ID → joined sessions. Entries are removed when they empty.
    by_user: DashMap<UserId, HashSet<SessionId>>,
    /// Room memberships.
    rooms: Arc<RoomRegistry>,
    /// Presence tracker.
    presence: Arc<PresenceTracker>,
    /// Delivery counters for broadcasts.
    metrics: Arc<RealtimeMetrics>,
    /// Outbound buffer per session.
    buffer_size: usize,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    pub fn new(
        rooms: Arc<RoomRegistry>,
        presence: Arc<PresenceTracker>,
        metrics: Arc<RealtimeMetrics>,
        buffer_size: usize,
    ) -> Self {
        Self {
            by_id: DashMap::new(),
            by_user: DashMap::new(),
            rooms,
            presence,
            metrics,
            buffer_size: buffer_size.max(1),
        }
    }

    /// Allocates a new unbound session.
    ///
    /// Returns the handle and the receiver for its outbound events.
    pub fn connect(&self) -> (Arc<SessionHandle>, mpsc::Receiver<OutboundEvent>) {
        let (tx, rx) = mpsc::channel(self.buffer_size);
        let handle = Arc::new(SessionHandle::new(tx));
        self.by_id.insert(handle.id, handle.clone());

        info!(session_id = %handle.id, "Session connected");
        (handle, rx)
    }

    /// Binds a session to a user and enrolls it in the personal room.
    pub fn on_join(&self, session_id: SessionId, user_id: &UserId) -> AppResult<JoinOutcome> {
        if user_id.is_blank() {
            return Err(AppError::validation("User ID must not be empty"));
        }

        let handle = self
            .get(session_id)
            .ok_or_else(|| AppError::not_found(format!("Session {session_id} not found")))?;

        match handle.bind(user_id) {
            Ok(true) => {}
            Ok(false) => {
                debug!(session_id = %session_id, user_id = %user_id, "Repeated join ignored");
                return Ok(JoinOutcome::AlreadyJoined);
            }
            Err(existing) => {
                warn!(
                    session_id = %session_id,
                    bound_user = %existing,
                    requested_user = %user_id,
                    "Rejected join: session is bound to another user"
                );
                return Err(AppError::conflict(format!(
                    "Session {session_id} is already bound to another user"
                )));
            }
        }

        let mut sessions = self.by_user.entry(user_id.clone()).or_default();
        // A disconnect that raced ahead of this join has already swept the
        // session; adding it now would leave a phantom online user.
        if !handle.is_alive() {
            drop(sessions);
            self.by_user.remove_if(user_id, |_, s| s.is_empty());
            return Err(AppError::not_found(format!(
                "Session {session_id} disconnected"
            )));
        }

        let first = sessions.is_empty();
        sessions.insert(session_id);
        self.rooms.join(room_for_user(user_id), session_id);

        let presence = if first {
            let change = self.presence.on_transition(user_id, true);
            if let Some(change) = &change {
                self.broadcast(&OutboundEvent::from(change));
            }
            change
        } else {
            None
        };
        let count = sessions.len();
        drop(sessions);

        info!(
            session_id = %session_id,
            user_id = %user_id,
            sessions = count,
            "Session joined"
        );
        Ok(JoinOutcome::Joined { presence })
    }

    /// Removes a session. Unknown or already-removed ids are a no-op and
    /// return `None`, so of several concurrent calls exactly one sees
    /// `Some`.
    pub fn on_disconnect(&self, session_id: SessionId) -> Option<Disconnected> {
        let (_, handle) = self.by_id.remove(&session_id)?;
        handle.mark_dead();

        let mut change = None;
        if let Some(user_id) = handle.user_id() {
            if let Entry::Occupied(mut entry) = self.by_user.entry(user_id.clone()) {
                entry.get_mut().remove(&session_id);
                if entry.get().is_empty() {
                    change = self.presence.on_transition(user_id, false);
                    if let Some(change) = &change {
                        self.broadcast(&OutboundEvent::from(change));
                    }
                    entry.remove();
                }
            }
        }

        self.rooms.leave_all(session_id);

        info!(
            session_id = %session_id,
            user_id = ?handle.user_id(),
            "Session disconnected"
        );
        Some(Disconnected {
            user_id: handle.user_id().cloned(),
            presence: change,
        })
    }

    /// Sends an event to every open session, joined or not. Returns the
    /// number reached.
    pub fn broadcast(&self, event: &OutboundEvent) -> usize {
        let reached = self
            .by_id
            .iter()
            .filter(|entry| entry.value().send(event.clone()))
            .count();
        self.metrics.delivered(reached);
        reached
    }

    /// Sessions joined by a user.
    pub fn sessions_for(&self, user_id: &UserId) -> HashSet<SessionId> {
        self.by_user
            .get(user_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Gets a session by ID.
    pub fn get(&self, session_id: SessionId) -> Option<Arc<SessionHandle>> {
        self.by_id.get(&session_id).map(|entry| entry.value().clone())
    }

    /// Returns all open sessions.
    pub fn all_sessions(&self) -> Vec<Arc<SessionHandle>> {
        self.by_id
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Number of open sessions, joined or not.
    pub fn session_count(&self) -> usize {
        self.by_id.len()
    }

    /// Number of users with at least one joined session.
    pub fn user_count(&self) -> usize {
        self.by_user.len()
    }

    /// Whether a user has at least one joined session.
    pub fn is_user_connected(&self, user_id: &UserId) -> bool {
        self.by_user
            .get(user_id)
            .map(|entry| !entry.is_empty())
            .unwrap_or(false)
    }
}
