//! Notification producer configuration.

use serde::{Deserialize, Serialize};

/// Settings for the persist-then-notify producers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Maximum followers notified when a story is posted.
    #[serde(default = "default_story_fanout_limit")]
    pub story_fanout_limit: usize,
    /// Characters of a chat message copied into its notification.
    #[serde(default = "default_preview_length")]
    pub preview_length: usize,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            story_fanout_limit: default_story_fanout_limit(),
            preview_length: default_preview_length(),
        }
    }
}

fn default_story_fanout_limit() -> usize {
    50
}

fn default_preview_length() -> usize {
    100
}
