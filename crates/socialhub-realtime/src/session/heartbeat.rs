//! Ping/pong heartbeat for session liveness.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time;

use socialhub_core::config::RealtimeConfig;

use super::handle::SessionHandle;
use crate::message::types::OutboundEvent;

/// Heartbeat configuration
#[derive(Debug, Clone)]
pub struct HeartbeatConfig {
    /// Interval between pings
    pub ping_interval: Duration,
    /// Timeout before considering the session dead
    pub ping_timeout: Duration,
}

impl From<&RealtimeConfig> for HeartbeatConfig {
    fn from(config: &RealtimeConfig) -> Self {
        Self {
            ping_interval: config.ping_interval(),
            ping_timeout: config.ping_timeout(),
        }
    }
}

/// Run the heartbeat loop for a session.
///
/// Queues a `ping` event every interval; the socket writer sends it both as
/// a WebSocket ping frame and as the JSON event. Either kind of pong
/// refreshes the session. Returns once no pong has been seen within the
/// timeout, or once the session is dead. The caller treats the return
/// exactly like a disconnect.
pub async fn run_heartbeat(handle: Arc<SessionHandle>, config: HeartbeatConfig) {
    let mut interval = time::interval(config.ping_interval);
    // The first tick completes immediately.
    interval.tick().await;

    loop {
        interval.tick().await;

        if !handle.is_alive() {
            break;
        }

        let elapsed = Utc::now() - handle.last_pong();
        if let Ok(elapsed_std) = elapsed.to_std() {
            if elapsed_std > config.ping_timeout {
                tracing::warn!(
                    session_id = %handle.id,
                    elapsed_ms = elapsed_std.as_millis() as u64,
                    "Session heartbeat timeout"
                );
                handle.mark_dead();
                break;
            }
        }

        let ping = OutboundEvent::Ping {
            timestamp: Utc::now().timestamp_millis(),
        };
        if !handle.send(ping) && !handle.is_alive() {
            tracing::debug!(session_id = %handle.id, "Ping send failed, session closed");
            break;
        }
    }

    tracing::debug!(session_id = %handle.id, "Heartbeat loop ended");
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;

    fn config(interval_ms: u64, timeout_ms: u64) -> HeartbeatConfig {
        HeartbeatConfig {
            ping_interval: Duration::from_millis(interval_ms),
            ping_timeout: Duration::from_millis(timeout_ms),
        }
    }

    #[tokio::test]
    async fn test_silent_session_times_out() {
        let (tx, mut rx) = mpsc::channel(16);
        let handle = Arc::new(SessionHandle::new(tx));

        time::timeout(
            Duration::from_secs(2),
            run_heartbeat(handle.clone(), config(20, 50)),
        )
        .await
        .expect("heartbeat should end on timeout");

        assert!(!handle.is_alive());
        assert!(matches!(rx.try_recv(), Ok(OutboundEvent::Ping { .. })));
    }

    #[tokio::test]
    async fn test_pongs_keep_session_alive() {
        let (tx, _rx) = mpsc::channel(64);
        let handle = Arc::new(SessionHandle::new(tx));
        let beat = tokio::spawn(run_heartbeat(handle.clone(), config(20, 60)));

        for _ in 0..10 {
            time::sleep(Duration::from_millis(15)).await;
            handle.touch_pong();
        }
        assert!(handle.is_alive());

        handle.mark_dead();
        time::timeout(Duration::from_secs(1), beat)
            .await
            .expect("heartbeat should stop for a dead session")
            .unwrap();
    }
}
