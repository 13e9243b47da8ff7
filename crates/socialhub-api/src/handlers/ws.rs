//! WebSocket upgrade handler.

use axum::body::Bytes;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::{IntoResponse, Response};
use futures::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use socialhub_auth::Claims;
use socialhub_core::error::AppError;
use socialhub_core::types::SessionId;
use socialhub_realtime::{InboundEvent, OutboundEvent};
use socialhub_realtime::message::parse_inbound;
use socialhub_realtime::message::serializer::encode_outbound;
use socialhub_realtime::session::heartbeat::run_heartbeat;

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameter for WebSocket authentication.
#[derive(Debug, serde::Deserialize)]
pub struct WsQuery {
    /// JWT access token.
    pub token: Option<String>,
}

/// GET /ws?token={jwt}
///
/// The token is verified before the upgrade, so an unauthenticated client
/// gets a plain 401 and never holds a session.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let claims = match authenticate(&state, query.token.as_deref()) {
        Ok(claims) => claims,
        Err(e) => {
            debug!(error = %e.0, "Rejected WebSocket upgrade");
            return e.into_response();
        }
    };

    match ws {
        Ok(ws) => ws
            .max_message_size(state.config.realtime.max_message_size_bytes)
            .on_upgrade(move |socket| handle_socket(state, claims, socket)),
        Err(rejection) => rejection.into_response(),
    }
}

fn authenticate(state: &AppState, token: Option<&str>) -> Result<Claims, ApiError> {
    let token = token
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::authentication("Missing token"))?;
    Ok(state.jwt_decoder.verify(token)?)
}

/// Drives one established connection until the client leaves, the
/// heartbeat gives up, or the server shuts down.
async fn handle_socket(state: AppState, claims: Claims, socket: WebSocket) {
    let engine = state.realtime.clone();
    let router = engine.router.clone();
    let (handle, mut outbound_rx) = router.connect();
    let session_id = handle.id;
    let user_id = claims.user_id().clone();

    info!(session_id = %session_id, user_id = %user_id, "WebSocket connection established");

    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut heartbeat = tokio::spawn(run_heartbeat(handle.clone(), engine.heartbeat_config()));
    let mut shutdown_rx = engine.shutdown_receiver();

    loop {
        tokio::select! {
            outbound = outbound_rx.recv() => {
                let Some(event) = outbound else { break };
                // Each heartbeat tick also goes out as a transport ping, so a
                // client whose WebSocket stack answers pings stays alive
                // without handling the `ping` event.
                if matches!(event, OutboundEvent::Ping { .. })
                    && ws_tx.send(Message::Ping(Bytes::new())).await.is_err()
                {
                    break;
                }
                match encode_outbound(&event) {
                    Ok(text) => {
                        if ws_tx.send(Message::Text(text.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!(session_id = %session_id, event = event.name(), error = %e, "Failed to encode outbound event"),
                }
            }
            inbound = ws_rx.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        handle_text(&state, session_id, &claims, text.as_str());
                    }
                    Some(Ok(Message::Pong(_))) => handle.touch_pong(),
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(session_id = %session_id, error = %e, "WebSocket error");
                        break;
                    }
                }
            }
            _ = &mut heartbeat => break,
            _ = shutdown_rx.recv() => break,
        }

        if !handle.is_alive() {
            break;
        }
    }

    heartbeat.abort();
    router.disconnect(session_id);
    let _ = ws_tx.close().await;

    info!(session_id = %session_id, user_id = %user_id, "WebSocket connection closed");
}

/// Parses one text frame. A `join` may only name the authenticated user.
fn handle_text(state: &AppState, session_id: SessionId, claims: &Claims, raw: &str) {
    let router = &state.realtime.router;

    let event = match parse_inbound(raw, state.config.realtime.max_message_size_bytes) {
        Ok(event) => event,
        Err(e) => {
            router.metrics().inbound_rejected();
            warn!(session_id = %session_id, error = %e, "Dropping malformed inbound event");
            return;
        }
    };

    if let InboundEvent::Join(requested) = &event {
        if requested != claims.user_id() {
            router.metrics().inbound_rejected();
            warn!(
                session_id = %session_id,
                user_id = %claims.user_id(),
                requested = %requested,
                "Rejecting join for a user other than the token subject"
            );
            return;
        }
    }

    router.dispatch(session_id, event);
}
