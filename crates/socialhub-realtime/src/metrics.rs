//! Realtime engine metrics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Engine-level counters.
#[derive(Debug, Default)]
pub struct RealtimeMetrics {
    /// Sessions opened
    sessions_opened: AtomicU64,
    /// Sessions closed
    sessions_closed: AtomicU64,
    /// Inbound events accepted
    inbound_events: AtomicU64,
    /// Inbound frames dropped as malformed or unauthorised
    inbound_rejected: AtomicU64,
    /// Events handed to a session buffer
    events_delivered: AtomicU64,
    /// Deliveries that found no session
    deliveries_dropped: AtomicU64,
    /// Online/offline transitions
    presence_transitions: AtomicU64,
    /// Joins rejected because the session was bound to another user
    bind_conflicts: AtomicU64,
}

impl RealtimeMetrics {
    /// Create new zeroed metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a session open.
    pub fn session_opened(&self) {
        self.sessions_opened.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a session close.
    pub fn session_closed(&self) {
        self.sessions_closed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an accepted inbound event.
    pub fn inbound_accepted(&self) {
        self.inbound_events.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a dropped inbound frame.
    pub fn inbound_rejected(&self) {
        self.inbound_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record deliveries to `count` sessions; zero counts as a dropped delivery.
    pub fn delivered(&self, count: usize) {
        if count == 0 {
            self.deliveries_dropped.fetch_add(1, Ordering::Relaxed);
        } else {
            self.events_delivered
                .fetch_add(count as u64, Ordering::Relaxed);
        }
    }

    /// Record a presence transition.
    pub fn presence_transition(&self) {
        self.presence_transitions.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a bind conflict.
    pub fn bind_conflict(&self) {
        self.bind_conflicts.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            sessions_opened: self.sessions_opened.load(Ordering::Relaxed),
            sessions_closed: self.sessions_closed.load(Ordering::Relaxed),
            inbound_events: self.inbound_events.load(Ordering::Relaxed),
            inbound_rejected: self.inbound_rejected.load(Ordering::Relaxed),
            events_delivered: self.events_delivered.load(Ordering::Relaxed),
            deliveries_dropped: self.deliveries_dropped.load(Ordering::Relaxed),
            presence_transitions: self.presence_transitions.load(Ordering::Relaxed),
            bind_conflicts: self.bind_conflicts.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Sessions opened
    pub sessions_opened: u64,
    /// Sessions closed
    pub sessions_closed: u64,
    /// Inbound events accepted
    pub inbound_events: u64,
    /// Inbound frames dropped
    pub inbound_rejected: u64,
    /// Events handed to session buffers
    pub events_delivered: u64,
    /// Deliveries that found no session
    pub deliveries_dropped: u64,
    /// Presence transitions
    pub presence_transitions: u64,
    /// Bind conflicts
    pub bind_conflicts: u64,
}
