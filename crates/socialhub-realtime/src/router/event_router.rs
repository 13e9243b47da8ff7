//! Event router: dispatches inbound events and fans out deliveries.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use socialhub_core::config::RealtimeConfig;
use socialhub_core::error::ErrorKind;
use socialhub_core::result::AppResult;
use socialhub_core::types::{ChatId, SessionId, UserId};

use crate::message::parse_inbound;
use crate::message::types::{InboundEvent, OutboundEvent};
use crate::metrics::RealtimeMetrics;
use crate::presence::status::PresenceChange;
use crate::presence::tracker::PresenceTracker;
use crate::room::key::{RoomKey, room_for_chat, room_for_user};
use crate::room::registry::RoomRegistry;
use crate::session::handle::SessionHandle;
use crate::session::registry::{ConnectionRegistry, JoinOutcome};

use super::notifier::Notifier;

/// Routes events between sessions and rooms.
#[derive(Debug)]
pub struct EventRouter {
    /// Session registry.
    registry: Arc<ConnectionRegistry>,
    /// Room registry.
    rooms: Arc<RoomRegistry>,
    /// Presence tracker.
    presence: Arc<PresenceTracker>,
    /// Metrics.
    metrics: Arc<RealtimeMetrics>,
    /// Configuration.
    config: RealtimeConfig,
}

impl EventRouter {
    /// Creates a new router.
    pub fn new(
        config: RealtimeConfig,
        registry: Arc<ConnectionRegistry>,
        rooms: Arc<RoomRegistry>,
        presence: Arc<PresenceTracker>,
        metrics: Arc<RealtimeMetrics>,
    ) -> Self {
        Self {
            registry,
            rooms,
            presence,
            metrics,
            config,
        }
    }

    /// Opens a new session.
    pub fn connect(&self) -> (Arc<SessionHandle>, mpsc::Receiver<OutboundEvent>) {
        self.metrics.session_opened();
        self.registry.connect()
    }

    /// Closes a session. Safe to call more than once, from any number of
    /// tasks; only the call that removes the session counts it closed.
    pub fn disconnect(&self, session_id: SessionId) -> Option<PresenceChange> {
        let closed = self.registry.on_disconnect(session_id)?;
        self.metrics.session_closed();
        if closed.presence.is_some() {
            self.metrics.presence_transition();
        }
        closed.presence
    }

    /// Closes every open session. Returns how many were closed.
    pub fn close_all(&self) -> usize {
        let sessions = self.registry.all_sessions();
        for session in &sessions {
            self.disconnect(session.id);
        }
        sessions.len()
    }

    /// Parses a raw text frame and dispatches it. Malformed frames are
    /// logged and dropped; nothing is sent back to the client.
    pub fn handle_inbound(&self, session_id: SessionId, raw: &str) {
        match parse_inbound(raw, self.config.max_message_size_bytes) {
            Ok(event) => self.dispatch(session_id, event),
            Err(e) => {
                self.metrics.inbound_rejected();
                warn!(session_id = %session_id, error = %e, "Dropping malformed inbound event");
            }
        }
    }

    /// Dispatches a parsed inbound event.
    pub fn dispatch(&self, session_id: SessionId, event: InboundEvent) {
        let Some(handle) = self.registry.get(session_id) else {
            warn!(session_id = %session_id, event = event.name(), "Event from unknown session");
            return;
        };

        match event {
            InboundEvent::Pong => {
                handle.touch_pong();
                self.metrics.inbound_accepted();
                return;
            }
            InboundEvent::Join(user_id) => {
                // Failures are logged where they are detected.
                let _ = self.join(session_id, &user_id);
                self.metrics.inbound_accepted();
                return;
            }
            _ => {}
        }

        let Some(user_id) = handle.user_id().cloned() else {
            self.metrics.inbound_rejected();
            warn!(
                session_id = %session_id,
                event = event.name(),
                "Ignoring event from a session that has not joined"
            );
            return;
        };

        match event {
            InboundEvent::JoinChatRoom { chat_id } => {
                self.join_chat(session_id, &chat_id);
            }
            InboundEvent::LeaveChatRoom { chat_id } => {
                self.leave_chat(session_id, &chat_id);
            }
            InboundEvent::Typing {
                chat_id,
                user_id: claimed,
            } => {
                if claimed.as_ref().is_some_and(|c| c != &user_id) {
                    debug!(
                        session_id = %session_id,
                        user_id = %user_id,
                        "Typing event names another user, attributing to the bound user"
                    );
                }
                self.typing(session_id, &chat_id);
            }
            InboundEvent::SendMessage {
                chat_id,
                message,
                sender_id,
            } => {
                if !self.config.legacy_send_message {
                    self.metrics.inbound_rejected();
                    warn!(
                        session_id = %session_id,
                        chat_id = %chat_id,
                        "Ignoring sendMessage: direct chat broadcast is disabled"
                    );
                    return;
                }
                if sender_id.as_ref().is_some_and(|s| s != &user_id) {
                    debug!(session_id = %session_id, user_id = %user_id, "sendMessage names another sender");
                }
                self.relay_message(session_id, &chat_id, message);
            }
            InboundEvent::Pong | InboundEvent::Join(_) => {}
        }

        self.metrics.inbound_accepted();
    }

    /// Binds a session to a user. See [`ConnectionRegistry::on_join`].
    pub fn join(&self, session_id: SessionId, user_id: &UserId) -> AppResult<JoinOutcome> {
        let result = self.registry.on_join(session_id, user_id);
        match &result {
            Ok(JoinOutcome::Joined { presence: Some(_) }) => self.metrics.presence_transition(),
            Ok(_) => {}
            Err(e) if e.is(ErrorKind::Conflict) => self.metrics.bind_conflict(),
            Err(e) => warn!(session_id = %session_id, error = %e, "Join rejected"),
        }
        result
    }

    /// Adds a joined session to a chat room. Returns whether it is a member
    /// afterwards.
    pub fn join_chat(&self, session_id: SessionId, chat_id: &ChatId) -> bool {
        let Some(handle) = self.registry.get(session_id) else {
            return false;
        };
        let key = room_for_chat(chat_id);
        if self.rooms.is_member(&key, session_id) {
            return true;
        }

        let max = self.config.max_chat_rooms_per_session;
        if self.rooms.chat_room_count(session_id) >= max {
            warn!(
                session_id = %session_id,
                chat_id = %chat_id,
                max,
                "Chat room limit reached, join ignored"
            );
            return false;
        }

        self.rooms.join(key.clone(), session_id);
        // A concurrent disconnect may already have swept this session's rooms.
        if !handle.is_alive() {
            self.rooms.leave(&key, session_id);
            return false;
        }
        true
    }

    /// Removes a session from a chat room.
    pub fn leave_chat(&self, session_id: SessionId, chat_id: &ChatId) -> bool {
        self.rooms.leave(&room_for_chat(chat_id), session_id)
    }

    /// Broadcasts `userTyping` to a chat room, excluding the typing session.
    /// The session enters the room if it is not already in it.
    pub fn typing(&self, session_id: SessionId, chat_id: &ChatId) -> usize {
        let Some(user_id) = self
            .registry
            .get(session_id)
            .and_then(|h| h.user_id().cloned())
        else {
            return 0;
        };
        self.join_chat(session_id, chat_id);
        self.deliver_to_room(
            &room_for_chat(chat_id),
            OutboundEvent::UserTyping { user_id },
            Some(session_id),
        )
    }

    /// Legacy direct chat broadcast: `receiveMessage` to the whole chat room,
    /// sender included.
    pub fn relay_message(&self, session_id: SessionId, chat_id: &ChatId, message: Value) -> usize {
        self.join_chat(session_id, chat_id);
        let reached = self.deliver_to_room(
            &room_for_chat(chat_id),
            OutboundEvent::ReceiveMessage(message),
            None,
        );
        info!(session_id = %session_id, chat_id = %chat_id, reached, "Relayed chat message");
        reached
    }

    /// Emits to every open session. Presence changes take the same path
    /// from inside the registry, so both are counted alike.
    pub fn deliver_global(&self, event: OutboundEvent) -> usize {
        self.registry.broadcast(&event)
    }

    /// Emits to every member of a room except `exclude`.
    pub fn deliver_to_room(
        &self,
        key: &RoomKey,
        event: OutboundEvent,
        exclude: Option<SessionId>,
    ) -> usize {
        let mut reached = 0;
        for session_id in self.rooms.members(key) {
            if Some(session_id) == exclude {
                continue;
            }
            if let Some(handle) = self.registry.get(session_id) {
                if handle.send(event.clone()) {
                    reached += 1;
                }
            }
        }

        if reached == 0 {
            debug!(room = %key, event = event.name(), "No session reached, event dropped");
        }
        self.metrics.delivered(reached);
        reached
    }

    /// Sessions joined by a user.
    pub fn sessions_for(&self, user_id: &UserId) -> HashSet<SessionId> {
        self.registry.sessions_for(user_id)
    }

    /// Session registry.
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Room registry.
    pub fn rooms(&self) -> &Arc<RoomRegistry> {
        &self.rooms
    }

    /// Presence tracker.
    pub fn presence(&self) -> &Arc<PresenceTracker> {
        &self.presence
    }

    /// Metrics.
    pub fn metrics(&self) -> &Arc<RealtimeMetrics> {
        &self.metrics
    }
}

impl Notifier for EventRouter {
    fn deliver_to_user(&self, user_id: &UserId, event: OutboundEvent) -> usize {
        self.deliver_to_room(&room_for_user(user_id), event, None)
    }

    fn deliver_to_chat(&self, chat_id: &ChatId, event: OutboundEvent) -> usize {
        self.deliver_to_room(&room_for_chat(chat_id), event, None)
    }
}
