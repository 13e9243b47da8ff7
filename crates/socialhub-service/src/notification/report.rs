//! Typed outcome of a producer run.

use serde::Serialize;

use socialhub_core::error::AppError;
use socialhub_core::types::UserId;

/// What a producer did for one domain event.
///
/// Live delivery is best-effort; a caller inspects `failures` to decide
/// whether anything is worth retrying.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryReport {
    /// Notifications stored.
    pub persisted: usize,
    /// Live events handed to sessions, summed over every push.
    pub sessions_reached: usize,
    /// Recipients skipped by rule (self-notifications).
    pub skipped: usize,
    /// Recipients for whom something failed.
    pub failures: Vec<DeliveryFailure>,
}

impl DeliveryReport {
    /// Whether every recipient was handled without error.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub(crate) fn fail(&mut self, recipient: &UserId, error: AppError) {
        self.failures.push(DeliveryFailure {
            recipient: recipient.clone(),
            error,
        });
    }
}

/// A recipient that could not be handled.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryFailure {
    /// Intended recipient.
    pub recipient: UserId,
    /// Cause.
    #[serde(serialize_with = "serialize_error")]
    pub error: AppError,
}

fn serialize_error<S: serde::Serializer>(error: &AppError, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(error)
}
