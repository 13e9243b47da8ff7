//! Application state shared across all handlers.

use std::sync::Arc;

use socialhub_auth::JwtDecoder;
use socialhub_core::config::AppConfig;
use socialhub_database::{DatabasePool, PresenceStore};
use socialhub_realtime::RealtimeEngine;
use socialhub_service::NotificationProducer;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Real-time engine
    pub realtime: Arc<RealtimeEngine>,
    /// Access token verification
    pub jwt_decoder: Arc<JwtDecoder>,
    /// Delivery producers, handed to the REST layer that owns the domain writes
    pub notifications: Arc<NotificationProducer>,
    /// Durable presence, read when a user is unknown to this process
    pub presence_store: Arc<dyn PresenceStore>,
    /// PostgreSQL pool, absent with the in-memory provider
    pub database: Option<DatabasePool>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("realtime", &self.realtime)
            .finish_non_exhaustive()
    }
}
