//! User summary attached to outgoing documents.

use serde::{Deserialize, Serialize};

use socialhub_core::types::UserId;

/// The denormalized slice of a user a client needs to render an actor
/// (name, handle, avatar) without a follow-up fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    /// User ID.
    #[serde(rename = "_id")]
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Unique handle.
    pub username: String,
    /// Avatar URL; empty when unset.
    #[serde(default)]
    pub avatar: String,
}
