//! Value objects for the chat domain.
//!
//! Each type validates its invariant on construction, so a value that
//! exists is always valid.

use std::fmt;

use super::error::ValueObjectError;

/// Room identifier bound to a connection.
///
/// The room is embedded in the endpoint query string, so it is restricted
/// to characters that never need escaping.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomId(String);

impl RoomId {
    /// Maximum number of characters in a room identifier
    pub const MAX_LEN: usize = 64;

    /// Create a new RoomId with validation
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.is_empty() {
            return Err(ValueObjectError::EmptyRoomId);
        }

        let len = value.chars().count();
        if len > Self::MAX_LEN {
            return Err(ValueObjectError::RoomIdTooLong {
                len,
                max: Self::MAX_LEN,
            });
        }

        if !value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ValueObjectError::InvalidRoomId(value));
        }

        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Display identity of the author of a chat event
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sender(String);

impl Sender {
    /// Create a new Sender with validation
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::EmptySender);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Text body of a chat message (never blank)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagePayload(String);

impl MessagePayload {
    /// Create a new MessagePayload with validation
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::EmptyPayload);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Unix timestamp in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}
