//! Handle to one live real-time connection.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use socialhub_core::types::{SessionId, UserId};

use crate::message::types::OutboundEvent;

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Transport open, no user bound.
    Connected,
    /// Bound to a user and in its personal room.
    Joined,
    /// Terminal.
    Disconnected,
}

/// A handle to a single session.
///
/// Holds the sender for pushing events to the client plus lifecycle
/// metadata. The user binding is write-once.
#[derive(Debug)]
pub struct SessionHandle {
    /// Unique session ID.
    pub id: SessionId,
    /// Bound user, set by the first successful join.
    user: OnceLock<UserId>,
    /// When the user was bound.
    joined_at: OnceLock<DateTime<Utc>>,
    /// Sender for outbound events.
    sender: mpsc::Sender<OutboundEvent>,
    /// When the transport opened.
    pub connected_at: DateTime<Utc>,
    /// Last pong, as milliseconds since the epoch.
    last_pong_ms: AtomicI64,
    /// Cleared on disconnect.
    alive: AtomicBool,
}

impl SessionHandle {
    /// Create a new, unbound session handle.
    pub fn new(sender: mpsc::Sender<OutboundEvent>) -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::new(),
            user: OnceLock::new(),
            joined_at: OnceLock::new(),
            sender,
            connected_at: now,
            last_pong_ms: AtomicI64::new(now.timestamp_millis()),
            alive: AtomicBool::new(true),
        }
    }

    /// Send an event to this session without waiting.
    ///
    /// A full buffer drops the event; a closed channel marks the session dead.
    pub fn send(&self, event: OutboundEvent) -> bool {
        if !self.is_alive() {
            return false;
        }
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(event)) => {
                tracing::warn!(
                    session_id = %self.id,
                    event = event.name(),
                    "Session send buffer full, dropping event"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_dead();
                false
            }
        }
    }

    /// Binds the session to `user_id`.
    ///
    /// Returns `Ok(true)` on the first bind, `Ok(false)` when already bound
    /// to the same user, and `Err(existing)` when bound to someone else.
    pub(crate) fn bind(&self, user_id: &UserId) -> Result<bool, UserId> {
        let mut fresh = false;
        let bound = self.user.get_or_init(|| {
            fresh = true;
            user_id.clone()
        });
        if bound != user_id {
            return Err(bound.clone());
        }
        if fresh {
            let _ = self.joined_at.set(Utc::now());
        }
        Ok(fresh)
    }

    /// The bound user, if any.
    pub fn user_id(&self) -> Option<&UserId> {
        self.user.get()
    }

    /// When the user was bound.
    pub fn joined_at(&self) -> Option<DateTime<Utc>> {
        self.joined_at.get().copied()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        if !self.is_alive() {
            SessionState::Disconnected
        } else if self.user.get().is_some() {
            SessionState::Joined
        } else {
            SessionState::Connected
        }
    }

    /// Check if the session is alive.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark the session dead.
    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    /// Record a pong.
    pub fn touch_pong(&self) {
        self.last_pong_ms
            .store(Utc::now().timestamp_millis(), Ordering::SeqCst);
    }

    /// Time of the last pong.
    pub fn last_pong(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.last_pong_ms.load(Ordering::SeqCst))
            .unwrap_or(self.connected_at)
    }
}
