//! Wire protocol: event types, JSON framing, and inbound validation.

pub mod serializer;
pub mod types;
pub mod validator;

use socialhub_core::result::AppResult;

use self::types::InboundEvent;

/// Validates, decodes, and checks a raw inbound text frame.
pub fn parse_inbound(raw: &str, max_size: usize) -> AppResult<InboundEvent> {
    validator::validate_frame(raw, max_size)?;
    let event = serializer::decode_inbound(raw)?;
    validator::validate_event(&event)?;
    Ok(event)
}
