//! Rooms: named broadcast groups of sessions.

pub mod key;
pub mod membership;
pub mod registry;
pub mod room;

pub use key::{RoomKey, room_for_chat, room_for_user};
pub use registry::RoomRegistry;
