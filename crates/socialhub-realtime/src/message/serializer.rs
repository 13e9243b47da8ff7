//! JSON serialization for WebSocket frames.

use socialhub_core::error::{AppError, ErrorKind};
use socialhub_core::result::AppResult;

use super::types::{InboundEvent, OutboundEvent};

/// Serialize an outbound event to a text frame.
pub fn encode_outbound(event: &OutboundEvent) -> AppResult<String> {
    Ok(serde_json::to_string(event)?)
}

/// Deserialize an inbound event from a text frame.
pub fn decode_inbound(text: &str) -> AppResult<InboundEvent> {
    serde_json::from_str(text).map_err(|e| {
        AppError::with_source(
            ErrorKind::Validation,
            format!("Malformed inbound event: {e}"),
            e,
        )
    })
}
