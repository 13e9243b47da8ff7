//! PostgreSQL implementations of the storage seams.

pub mod notification;
pub mod presence;

pub use notification::NotificationRepository;
pub use presence::PresenceRepository;
