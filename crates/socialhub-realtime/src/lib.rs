//! # socialhub-realtime
//!
//! Real-time fan-out layer for SocialHub. Provides:
//!
//! - Session registry mapping users to their live connections
//! - Personal (`user:<id>`) and chat (`chat:<id>`) rooms
//! - Presence tracking driven by zero-crossings of a user's session count,
//!   persisted through a version-stamped background writer
//! - Event routing for inbound client events and outbound deliveries
//! - Ping/pong heartbeat and engine metrics

pub mod message;
pub mod metrics;
pub mod presence;
pub mod room;
pub mod router;
pub mod server;
pub mod session;

pub use message::types::{InboundEvent, OutboundEvent};
pub use presence::tracker::PresenceTracker;
pub use room::key::RoomKey;
pub use room::registry::RoomRegistry;
pub use router::notifier::Notifier;
pub use router::EventRouter;
pub use server::RealtimeEngine;
pub use session::registry::{ConnectionRegistry, Disconnected, JoinOutcome};
