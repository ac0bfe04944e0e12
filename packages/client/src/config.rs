//! Client configuration.

use crate::domain::{Sender, ValueObjectError};

/// Default WebSocket endpoint of the chat server
pub const DEFAULT_SERVER_URL: &str = "ws://127.0.0.1:8080/ws";

/// Room joined on startup when none is given
pub const DEFAULT_ROOM: &str = "general";

/// Settings shared by every session a controller opens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base WebSocket address; the room is appended as a query parameter
    pub server_url: String,
    /// Identity stamped on outbound messages
    pub sender: Sender,
}

impl ClientConfig {
    pub fn new(server_url: impl Into<String>, sender: Sender) -> Self {
        Self {
            server_url: server_url.into(),
            sender,
        }
    }

    /// Build a configuration from raw strings, validating the sender
    pub fn try_from_parts(server_url: &str, sender: &str) -> Result<Self, ValueObjectError> {
        Ok(Self::new(server_url, Sender::new(sender.to_string())?))
    }
}
