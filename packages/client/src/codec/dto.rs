//! Wire-level frame DTOs.
//!
//! These mirror the JSON shape exchanged with the server and nothing
//! else; conversion to domain types happens in the parent module.

use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Frame type tag
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Message,
}

impl MessageType {
    pub const MESSAGE: &'static str = "message";
}

/// Frame sent by the client.
///
/// `timestamp` is a placeholder; the server stamps its own.
#[derive(Debug, Clone, Serialize)]
pub struct OutboundFrame<'a> {
    pub r#type: MessageType,
    pub payload: &'a str,
    pub room_id: &'a str,
    pub sender: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

/// Frame received from the server. Every field is required.
///
/// `timestamp` accepts any JSON number; senders stamping from a
/// floating-point clock produce fractional seconds.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct InboundFrame {
    pub r#type: String,
    pub payload: String,
    pub room_id: String,
    pub sender: String,
    pub timestamp: Number,
}
