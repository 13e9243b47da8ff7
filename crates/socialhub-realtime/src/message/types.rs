//! Inbound and outbound event definitions.
//!
//! Every frame is a JSON object `{"event": "<name>", "data": <payload>}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use socialhub_core::types::{ChatId, MessageId, UserId};

use crate::presence::status::PresenceStatus;

/// Events sent by the client to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum InboundEvent {
    /// Bind this session to a user and enter the personal room.
    Join(UserId),
    /// Enter a chat room to receive typing indicators.
    #[serde(rename_all = "camelCase")]
    JoinChatRoom {
        /// Chat to enter.
        chat_id: ChatId,
    },
    /// Leave a chat room.
    #[serde(rename_all = "camelCase")]
    LeaveChatRoom {
        /// Chat to leave.
        chat_id: ChatId,
    },
    /// The user is typing in a chat.
    #[serde(rename_all = "camelCase")]
    Typing {
        /// Chat being typed in.
        chat_id: ChatId,
        /// Claimed typist. The bound user always wins.
        #[serde(default)]
        user_id: Option<UserId>,
    },
    /// Direct chat broadcast, only honoured when the legacy path is enabled.
    #[serde(rename_all = "camelCase")]
    SendMessage {
        /// Target chat.
        chat_id: ChatId,
        /// Message body, relayed untouched.
        message: Value,
        /// Claimed sender.
        #[serde(default)]
        sender_id: Option<UserId>,
    },
    /// Heartbeat reply.
    Pong,
}

impl InboundEvent {
    /// Wire name of the event, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Join(_) => "join",
            Self::JoinChatRoom { .. } => "joinChatRoom",
            Self::LeaveChatRoom { .. } => "leaveChatRoom",
            Self::Typing { .. } => "typing",
            Self::SendMessage { .. } => "sendMessage",
            Self::Pong => "pong",
        }
    }
}

/// Events sent by the server to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum OutboundEvent {
    /// A chat message was persisted; sent to each recipient's personal room.
    #[serde(rename_all = "camelCase")]
    NewMessage {
        /// Owning chat.
        chat_id: ChatId,
        /// Populated message document.
        message: Value,
    },
    /// A notification was persisted; the payload is the full document.
    NewNotification(Value),
    /// A user went online or offline.
    #[serde(rename_all = "camelCase")]
    UserStatusChange {
        /// User whose presence changed.
        user_id: UserId,
        /// New status.
        status: PresenceStatus,
        /// Present only when going offline.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        last_seen: Option<DateTime<Utc>>,
    },
    /// Someone else in the chat is typing.
    #[serde(rename_all = "camelCase")]
    UserTyping {
        /// The typist.
        user_id: UserId,
    },
    /// A chat message was deleted.
    #[serde(rename_all = "camelCase")]
    MessageDeleted {
        /// Owning chat.
        chat_id: ChatId,
        /// Deleted message.
        message_id: MessageId,
    },
    /// Legacy direct chat broadcast.
    ReceiveMessage(Value),
    /// Server keepalive.
    Ping {
        /// Server timestamp in milliseconds.
        timestamp: i64,
    },
}

impl OutboundEvent {
    /// Wire name of the event, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::NewMessage { .. } => "newMessage",
            Self::NewNotification(_) => "newNotification",
            Self::UserStatusChange { .. } => "userStatusChange",
            Self::UserTyping { .. } => "userTyping",
            Self::MessageDeleted { .. } => "messageDeleted",
            Self::ReceiveMessage(_) => "receiveMessage",
            Self::Ping { .. } => "ping",
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_join_takes_bare_user_id() {
        let event: InboundEvent =
            serde_json::from_value(json!({"event": "join", "data": "u1"})).unwrap();
        assert_eq!(event, InboundEvent::Join(UserId::parse("u1").unwrap()));
    }

    #[test]
    fn test_pong_needs_no_data() {
        let event: InboundEvent = serde_json::from_value(json!({"event": "pong"})).unwrap();
        assert_eq!(event, InboundEvent::Pong);
    }

    #[test]
    fn test_typing_user_id_is_optional() {
        let event: InboundEvent =
            serde_json::from_value(json!({"event": "typing", "data": {"chatId": "c1"}})).unwrap();
        assert_eq!(
            event,
            InboundEvent::Typing {
                chat_id: ChatId::parse("c1").unwrap(),
                user_id: None
            }
        );
    }

    #[test]
    fn test_status_change_omits_last_seen_when_online() {
        let online = OutboundEvent::UserStatusChange {
            user_id: UserId::parse("u1").unwrap(),
            status: PresenceStatus::Online,
            last_seen: None,
        };
        assert_eq!(
            serde_json::to_value(&online).unwrap(),
            json!({"event": "userStatusChange", "data": {"userId": "u1", "status": "online"}})
        );
    }

    #[test]
    fn test_message_deleted_shape() {
        let event = OutboundEvent::MessageDeleted {
            chat_id: ChatId::parse("c1").unwrap(),
            message_id: MessageId::parse("m1").unwrap(),
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({"event": "messageDeleted", "data": {"chatId": "c1", "messageId": "m1"}})
        );
    }
}
