//! Codec error types.

use thiserror::Error;

use crate::domain::ValueObjectError;

/// Failure to build an outbound frame
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// Text is empty or whitespace-only
    #[error("Cannot encode an empty message")]
    EmptyPayload,

    /// Serializer failure
    #[error("Failed to serialize frame: {0}")]
    Serialize(String),
}

/// Failure to parse an inbound frame.
///
/// Always recovered locally: the frame is dropped and the session carries on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Frame is not valid JSON
    #[error("Frame is not valid JSON: {0}")]
    InvalidJson(String),

    /// JSON is valid but a required field is missing or has the wrong type
    #[error("Frame has an invalid shape: {0}")]
    InvalidShape(String),

    /// `type` is something other than "message"
    #[error("Unsupported frame type '{0}'")]
    UnsupportedType(String),

    /// A field failed domain validation
    #[error("Frame field '{field}' is invalid: {source}")]
    InvalidField {
        field: &'static str,
        #[source]
        source: ValueObjectError,
    },
}
