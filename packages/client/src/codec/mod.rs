//! Wire codec: converts between chat events and JSON text frames.
//!
//! Frame shape (both directions):
//!
//! ```text
//! { "type": "message", "payload": <text>, "room_id": <text>, "sender": <text>, "timestamp": <number> }
//! ```
//!
//! `timestamp` is optional on outbound frames and required on inbound ones.

pub mod dto;
mod error;

pub use error::{DecodeError, EncodeError};

use serde_json::{Number, error::Category};

use crate::domain::{ChatEvent, MessagePayload, RoomId, Sender, Timestamp};

use dto::{InboundFrame, MessageType, OutboundFrame};

/// A message submitted by the local user, before encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub text: String,
    pub room: RoomId,
    pub sender: Sender,
    pub timestamp: Option<Timestamp>,
}

/// Encode an outbound message into a JSON text frame
pub fn encode(message: &OutboundMessage) -> Result<String, EncodeError> {
    if message.text.trim().is_empty() {
        return Err(EncodeError::EmptyPayload);
    }

    let frame = OutboundFrame {
        r#type: MessageType::Message,
        payload: &message.text,
        room_id: message.room.as_str(),
        sender: message.sender.as_str(),
        timestamp: message.timestamp.map(|t| t.value()),
    };

    serde_json::to_string(&frame).map_err(|e| EncodeError::Serialize(e.to_string()))
}

/// Decode a JSON text frame into a chat event
pub fn decode(raw: &str) -> Result<ChatEvent, DecodeError> {
    let frame: InboundFrame = serde_json::from_str(raw).map_err(|e| match e.classify() {
        Category::Data => DecodeError::InvalidShape(e.to_string()),
        Category::Syntax | Category::Eof | Category::Io => DecodeError::InvalidJson(e.to_string()),
    })?;

    if frame.r#type != MessageType::MESSAGE {
        return Err(DecodeError::UnsupportedType(frame.r#type));
    }

    let payload = MessagePayload::new(frame.payload).map_err(|source| DecodeError::InvalidField {
        field: "payload",
        source,
    })?;
    let room_id = RoomId::new(frame.room_id).map_err(|source| DecodeError::InvalidField {
        field: "room_id",
        source,
    })?;
    let sender = Sender::new(frame.sender).map_err(|source| DecodeError::InvalidField {
        field: "sender",
        source,
    })?;

    Ok(ChatEvent::message(
        payload,
        room_id,
        sender,
        timestamp_from_number(&frame.timestamp),
    ))
}

/// Whole seconds of a JSON number; fractions are truncated toward zero
/// and out-of-range values saturate.
fn timestamp_from_number(number: &Number) -> Timestamp {
    let secs = number
        .as_i64()
        .or_else(|| number.as_u64().map(|v| i64::try_from(v).unwrap_or(i64::MAX)))
        .or_else(|| number.as_f64().map(|v| v.trunc() as i64))
        .unwrap_or_default();
    Timestamp::new(secs)
}
