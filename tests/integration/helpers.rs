//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use socialhub_api::{AppState, build_app};
use socialhub_auth::{JwtDecoder, JwtEncoder};
use socialhub_core::config::AppConfig;
use socialhub_core::types::UserId;
use socialhub_database::memory::{MemoryNotificationStore, MemoryPresenceStore};
use socialhub_entity::UserSummary;
use socialhub_realtime::{OutboundEvent, RealtimeEngine};
use socialhub_service::NotificationProducer;

/// Test application context backed by in-memory stores.
pub struct TestApp {
    /// Shared handler state
    pub state: AppState,
    /// Real-time engine
    pub engine: Arc<RealtimeEngine>,
    /// Delivery producers wired to the engine
    pub producer: Arc<NotificationProducer>,
    /// Presence persistence
    pub presence_store: Arc<MemoryPresenceStore>,
    /// Notification persistence
    pub notification_store: Arc<MemoryNotificationStore>,
    /// Issues tokens the app accepts
    pub encoder: JwtEncoder,
}

impl TestApp {
    /// Create a new test application with default settings.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Create a new test application. Must run inside a Tokio runtime.
    pub fn with_config(mut config: AppConfig) -> Self {
        config.auth.jwt_secret = "integration-test-secret".to_string();

        let presence_store = Arc::new(MemoryPresenceStore::new());
        let notification_store = Arc::new(MemoryNotificationStore::new());

        let engine = Arc::new(RealtimeEngine::new(
            config.realtime.clone(),
            presence_store.clone(),
        ));
        let producer = Arc::new(NotificationProducer::new(
            notification_store.clone(),
            engine.router.clone(),
            config.notifications.clone(),
        ));
        let encoder = JwtEncoder::new(&config.auth);

        let state = AppState {
            jwt_decoder: Arc::new(JwtDecoder::new(&config.auth)),
            config: Arc::new(config),
            realtime: engine.clone(),
            notifications: producer.clone(),
            presence_store: presence_store.clone(),
            database: None,
        };

        Self {
            state,
            engine,
            producer,
            presence_store,
            notification_store,
            encoder,
        }
    }

    /// The full HTTP application.
    pub fn router(&self) -> Router {
        build_app(self.state.clone())
    }

    /// A valid access token for `user`.
    pub fn token_for(&self, user: &str) -> String {
        self.encoder
            .issue(&uid(user), chrono::Duration::minutes(5))
            .expect("Failed to issue token")
    }

    /// Serve the application on an ephemeral local port.
    pub async fn spawn(&self) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("No local address");
        let app = self.router();
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server failed");
        });
        addr
    }
}

/// Parse a user id.
pub fn uid(s: &str) -> UserId {
    UserId::parse(s).expect("Invalid user id")
}

/// A populated sender.
pub fn summary(id: &str) -> UserSummary {
    UserSummary {
        id: uid(id),
        name: format!("User {id}"),
        username: id.to_string(),
        avatar: format!("https://cdn.example/{id}.png"),
    }
}

/// Everything currently queued for a session, as wire JSON.
pub fn drain(rx: &mut mpsc::Receiver<OutboundEvent>) -> Vec<Value> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(serde_json::to_value(&event).expect("Failed to encode event"));
    }
    events
}

/// Only the events named `name`.
pub fn named<'a>(events: &'a [Value], name: &str) -> Vec<&'a Value> {
    events.iter().filter(|e| e["event"] == name).collect()
}
