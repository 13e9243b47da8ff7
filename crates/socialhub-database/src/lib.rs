//! # socialhub-database
//!
//! Storage for the two durable side effects of the real-time layer: the
//! presence columns on a user record and notification documents.
//!
//! [`store`] defines the seams the realtime and service crates consume;
//! [`repositories`] implements them on PostgreSQL and [`memory`] on
//! process-local maps.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use store::{NotificationStore, PresenceRecord, PresenceStore};
