//! Domain error types.

use thiserror::Error;

/// Errors raised when constructing value objects
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    /// Room identifier is empty
    #[error("Room ID must not be empty")]
    EmptyRoomId,

    /// Room identifier exceeds the maximum length
    #[error("Room ID is too long: {len} characters (max {max})")]
    RoomIdTooLong { len: usize, max: usize },

    /// Room identifier contains a character outside the allowed set
    #[error("Room ID '{0}' contains invalid characters (allowed: a-z, A-Z, 0-9, '-', '_')")]
    InvalidRoomId(String),

    /// Sender is empty or whitespace-only
    #[error("Sender must not be empty")]
    EmptySender,

    /// Message payload is empty or whitespace-only
    #[error("Message payload must not be empty")]
    EmptyPayload,
}
