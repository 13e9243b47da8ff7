//! Inbound validation rules.

use socialhub_core::error::AppError;

use super::types::InboundEvent;

/// Validates the raw frame before parsing.
pub fn validate_frame(raw: &str, max_size: usize) -> Result<(), AppError> {
    if raw.len() > max_size {
        return Err(AppError::validation(format!(
            "Message exceeds maximum size of {max_size} bytes"
        )));
    }

    if raw.trim().is_empty() {
        return Err(AppError::validation("Empty message"));
    }

    Ok(())
}

/// Rejects events carrying blank identifiers.
pub fn validate_event(event: &InboundEvent) -> Result<(), AppError> {
    let blank = match event {
        InboundEvent::Join(user_id) => user_id.is_blank(),
        InboundEvent::JoinChatRoom { chat_id }
        | InboundEvent::LeaveChatRoom { chat_id }
        | InboundEvent::Typing { chat_id, .. }
        | InboundEvent::SendMessage { chat_id, .. } => chat_id.is_blank(),
        InboundEvent::Pong => false,
    };

    if blank {
        return Err(AppError::validation(format!(
            "Event '{}' carries an empty identifier",
            event.name()
        )));
    }

    Ok(())
}
