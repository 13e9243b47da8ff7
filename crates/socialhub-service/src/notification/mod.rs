//! Notification producers and their delivery reports.

pub mod producer;
pub mod report;

pub use producer::NotificationProducer;
pub use report::{DeliveryFailure, DeliveryReport};
