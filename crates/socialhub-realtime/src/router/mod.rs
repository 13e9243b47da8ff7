//! Event routing: inbound client events and outbound deliveries.

pub mod event_router;
pub mod notifier;

pub use event_router::EventRouter;
pub use notifier::Notifier;
