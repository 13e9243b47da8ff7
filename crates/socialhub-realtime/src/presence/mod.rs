//! Presence: online/offline state derived from session zero-crossings.

pub mod status;
pub mod tracker;
pub mod writer;

pub use status::{PresenceChange, PresenceState, PresenceStatus};
pub use tracker::PresenceTracker;
