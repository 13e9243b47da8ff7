//! Real-time WebSocket engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Real-time (WebSocket) engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Outbound buffer per session; events beyond it are dropped.
    #[serde(default = "default_session_buffer")]
    pub session_buffer_size: usize,
    /// Interval between server pings, in seconds.
    #[serde(default = "default_ping_interval")]
    pub ping_interval_seconds: u64,
    /// A session with no pong for this long is disconnected, in seconds.
    #[serde(default = "default_ping_timeout")]
    pub ping_timeout_seconds: u64,
    /// Maximum chat rooms a single session may be in.
    #[serde(default = "default_max_chat_rooms")]
    pub max_chat_rooms_per_session: usize,
    /// Maximum inbound frame size in bytes.
    #[serde(default = "default_max_message_size")]
    pub max_message_size_bytes: usize,
    /// Accept inbound `sendMessage` and rebroadcast it as `receiveMessage`.
    ///
    /// Off by default: chat messages are persisted over REST and pushed as
    /// `newMessage`.
    #[serde(default)]
    pub legacy_send_message: bool,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            session_buffer_size: default_session_buffer(),
            ping_interval_seconds: default_ping_interval(),
            ping_timeout_seconds: default_ping_timeout(),
            max_chat_rooms_per_session: default_max_chat_rooms(),
            max_message_size_bytes: default_max_message_size(),
            legacy_send_message: false,
        }
    }
}

impl RealtimeConfig {
    /// Ping interval as a [`Duration`].
    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_seconds)
    }

    /// Ping timeout as a [`Duration`].
    pub fn ping_timeout(&self) -> Duration {
        Duration::from_secs(self.ping_timeout_seconds)
    }

    /// Rejects heartbeat settings no session could live with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.ping_interval_seconds == 0 {
            return Err(AppError::configuration(
                "realtime.ping_interval_seconds must be greater than zero",
            ));
        }
        if self.ping_timeout_seconds < self.ping_interval_seconds {
            return Err(AppError::configuration(format!(
                "realtime.ping_timeout_seconds ({}) must not be shorter than ping_interval_seconds ({})",
                self.ping_timeout_seconds, self.ping_interval_seconds
            )));
        }
        Ok(())
    }
}

fn default_session_buffer() -> usize {
    256
}

fn default_ping_interval() -> u64 {
    25
}

fn default_ping_timeout() -> u64 {
    60
}

fn default_max_chat_rooms() -> usize {
    50
}

fn default_max_message_size() -> usize {
    65_536
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_defaults_are_valid() {
        assert!(RealtimeConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_heartbeat_settings_are_rejected() {
        let zero_interval = RealtimeConfig {
            ping_interval_seconds: 0,
            ..RealtimeConfig::default()
        };
        assert!(zero_interval.validate().unwrap_err().is(ErrorKind::Configuration));

        let zero_timeout = RealtimeConfig {
            ping_timeout_seconds: 0,
            ..RealtimeConfig::default()
        };
        assert!(zero_timeout.validate().is_err());

        let short_timeout = RealtimeConfig {
            ping_interval_seconds: 30,
            ping_timeout_seconds: 10,
            ..RealtimeConfig::default()
        };
        assert!(short_timeout.validate().is_err());
    }
}
