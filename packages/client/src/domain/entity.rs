//! Chat event entity.

use super::value_object::{MessagePayload, RoomId, Sender, Timestamp};

/// Kind of a chat event.
///
/// `Message` is the only kind exchanged with clients; other kinds the
/// server may emit are rejected by the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Message,
}

/// A chat event received from (or submitted to) a room.
///
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEvent {
    pub kind: EventKind,
    pub payload: MessagePayload,
    pub room_id: RoomId,
    pub sender: Sender,
    pub timestamp: Timestamp,
}

impl ChatEvent {
    /// Create a new message event
    pub fn message(
        payload: MessagePayload,
        room_id: RoomId,
        sender: Sender,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            kind: EventKind::Message,
            payload,
            room_id,
            sender,
            timestamp,
        }
    }

    /// Whether this event belongs to the given room
    pub fn belongs_to(&self, room: &RoomId) -> bool {
        &self.room_id == room
    }
}
