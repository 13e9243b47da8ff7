//! Health check handlers.

use axum::Json;
use axum::extract::State;
use tracing::warn;

use crate::dto::response::{ApiResponse, DetailedHealthResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health() -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::ok(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

/// GET /api/health/detailed
///
/// Reports `degraded` when the database does not answer; live fan-out keeps
/// working without it.
pub async fn health_detailed(
    State(state): State<AppState>,
) -> Json<ApiResponse<DetailedHealthResponse>> {
    let engine = &state.realtime;

    let (database, reachable) = match &state.database {
        Some(pool) => match pool.health_check().await {
            Ok(()) => ("connected".to_string(), true),
            Err(e) => {
                warn!(error = %e, "Database health check failed");
                ("unavailable".to_string(), false)
            }
        },
        None => (state.config.database.provider.to_string(), true),
    };

    Json(ApiResponse::ok(DetailedHealthResponse {
        status: if reachable { "ok" } else { "degraded" }.to_string(),
        database,
        ws_sessions: engine.registry.session_count(),
        connected_users: engine.registry.user_count(),
        online_users: engine.presence.online_count(),
        metrics: engine.metrics.snapshot(),
    }))
}
