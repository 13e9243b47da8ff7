//! # socialhub-service
//!
//! Delivery producers. Each one runs after the REST layer has persisted a
//! domain fact (a like, a follow, a chat message), stores the matching
//! notification, and only then pushes it to the recipient's live sessions.

pub mod notification;

pub use notification::{DeliveryFailure, DeliveryReport, NotificationProducer};
