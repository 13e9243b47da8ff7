//! In-memory implementations of the storage seams.
//!
//! Selected with `database.provider = "memory"` and used throughout the
//! test suites. Both stores can be told to fail, to exercise the
//! log-and-continue paths.

pub mod notification;
pub mod presence;

pub use notification::MemoryNotificationStore;
pub use presence::MemoryPresenceStore;
