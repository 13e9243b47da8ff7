//! SocialHub real-time server
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing_subscriber::{EnvFilter, fmt};

use socialhub_api::{AppState, build_app};
use socialhub_auth::JwtDecoder;
use socialhub_core::config::{AppConfig, DatabaseProvider};
use socialhub_core::error::AppError;
use socialhub_database::memory::{MemoryNotificationStore, MemoryPresenceStore};
use socialhub_database::migration::run_migrations;
use socialhub_database::repositories::{NotificationRepository, PresenceRepository};
use socialhub_database::{DatabasePool, NotificationStore, PresenceStore};
use socialhub_realtime::RealtimeEngine;
use socialhub_service::NotificationProducer;

#[tokio::main]
async fn main() {
    let env = std::env::var("SOCIALHUB_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(env = %env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Durable stores for the configured provider.
struct Stores {
    presence: Arc<dyn PresenceStore>,
    notifications: Arc<dyn NotificationStore>,
    pool: Option<DatabasePool>,
}

async fn open_stores(config: &AppConfig) -> Result<Stores, AppError> {
    match config.database.provider {
        DatabaseProvider::Postgres => {
            tracing::info!("Connecting to database...");
            let pool = DatabasePool::connect(&config.database).await?;

            tracing::info!("Running database migrations...");
            run_migrations(pool.pool()).await?;

            Ok(Stores {
                presence: Arc::new(PresenceRepository::new(pool.pool().clone())),
                notifications: Arc::new(NotificationRepository::new(pool.pool().clone())),
                pool: Some(pool),
            })
        }
        DatabaseProvider::Memory => {
            tracing::warn!("Using in-memory stores; nothing survives a restart");
            Ok(Stores {
                presence: Arc::new(MemoryPresenceStore::new()),
                notifications: Arc::new(MemoryNotificationStore::new()),
                pool: None,
            })
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting SocialHub v{}", env!("CARGO_PKG_VERSION"));

    let stores = open_stores(&config).await?;

    // No session survives a restart.
    let reset = stores.presence.reset_online().await?;
    if reset > 0 {
        tracing::info!(users = reset, "Cleared stale online flags");
    }

    let realtime = Arc::new(RealtimeEngine::new(
        config.realtime.clone(),
        stores.presence.clone(),
    ));
    let notifications = Arc::new(NotificationProducer::new(
        stores.notifications.clone(),
        realtime.router.clone(),
        config.notifications.clone(),
    ));

    let addr = config.server.bind_address();
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);

    let state = AppState {
        jwt_decoder: Arc::new(JwtDecoder::new(&config.auth)),
        config: Arc::new(config),
        realtime: realtime.clone(),
        notifications,
        presence_store: stores.presence.clone(),
        database: stores.pool.clone(),
    };
    let app = build_app(state);

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
    tracing::info!(addr = %addr, "SocialHub server listening");

    let engine = realtime.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            // Open sockets keep the server alive until the engine closes them.
            match tokio::time::timeout(grace, engine.shutdown()).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::error!(error = %e, "Real-time engine shutdown failed"),
                Err(_) => tracing::warn!("Real-time engine shutdown exceeded the grace period"),
            }
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    if let Some(pool) = stores.pool {
        pool.close().await;
    }

    tracing::info!("SocialHub server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
