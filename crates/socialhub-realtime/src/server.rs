//! Top-level real-time engine that ties together all subsystems.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use socialhub_core::config::RealtimeConfig;
use socialhub_core::error::AppError;
use socialhub_database::PresenceStore;

use crate::metrics::RealtimeMetrics;
use crate::presence::tracker::PresenceTracker;
use crate::presence::writer::run_presence_writer;
use crate::room::registry::RoomRegistry;
use crate::router::EventRouter;
use crate::session::heartbeat::HeartbeatConfig;
use crate::session::registry::ConnectionRegistry;

/// How long shutdown waits for queued presence writes.
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Central real-time engine that coordinates all subsystems.
pub struct RealtimeEngine {
    /// Event router.
    pub router: Arc<EventRouter>,
    /// Session registry.
    pub registry: Arc<ConnectionRegistry>,
    /// Room registry.
    pub rooms: Arc<RoomRegistry>,
    /// Presence tracker.
    pub presence: Arc<PresenceTracker>,
    /// Metrics collector.
    pub metrics: Arc<RealtimeMetrics>,
    /// Configuration.
    config: RealtimeConfig,
    /// Shutdown signal sender.
    shutdown_tx: broadcast::Sender<()>,
    /// Presence writer task.
    writer: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine").finish()
    }
}

impl RealtimeEngine {
    /// Creates the engine and spawns the presence writer.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(config: RealtimeConfig, presence_store: Arc<dyn PresenceStore>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        let metrics = Arc::new(RealtimeMetrics::new());
        let rooms = Arc::new(RoomRegistry::new());
        let (tracker, queue) = PresenceTracker::new();
        let presence = Arc::new(tracker);
        let registry = Arc::new(ConnectionRegistry::new(
            rooms.clone(),
            presence.clone(),
            metrics.clone(),
            config.session_buffer_size,
        ));
        let router = Arc::new(EventRouter::new(
            config.clone(),
            registry.clone(),
            rooms.clone(),
            presence.clone(),
            metrics.clone(),
        ));

        let writer = tokio::spawn(run_presence_writer(
            presence_store,
            queue,
            Arc::downgrade(&presence),
            shutdown_tx.subscribe(),
        ));

        info!("Real-time engine initialized");

        Self {
            router,
            registry,
            rooms,
            presence,
            metrics,
            config,
            shutdown_tx,
            writer: Mutex::new(Some(writer)),
        }
    }

    /// Engine configuration.
    pub fn config(&self) -> &RealtimeConfig {
        &self.config
    }

    /// Heartbeat settings for new sessions.
    pub fn heartbeat_config(&self) -> HeartbeatConfig {
        HeartbeatConfig::from(&self.config)
    }

    /// Returns a shutdown receiver for graceful shutdown coordination.
    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Initiates a graceful shutdown of the real-time engine.
    ///
    /// Closes every session (queueing their offline transitions), signals
    /// all tasks to stop, and waits for the presence writer to drain.
    pub async fn shutdown(&self) -> Result<(), AppError> {
        info!("Shutting down real-time engine");

        let closed = self.router.close_all();
        let _ = self.shutdown_tx.send(());

        if let Some(writer) = self.writer.lock().await.take() {
            match tokio::time::timeout(WRITER_DRAIN_TIMEOUT, writer).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    return Err(AppError::internal(format!("Presence writer failed: {e}")));
                }
                Err(_) => warn!("Presence writer did not drain in time"),
            }
        }

        info!(sessions_closed = closed, "Real-time engine shut down");
        Ok(())
    }
}
