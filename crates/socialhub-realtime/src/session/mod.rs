//! Session lifecycle: handles, the connection registry, and heartbeat.

pub mod handle;
pub mod heartbeat;
pub mod registry;

pub use handle::{SessionHandle, SessionState};
pub use registry::{ConnectionRegistry, Disconnected, JoinOutcome};
