//! Transport error types.

use thiserror::Error;

/// Errors raised by the transport seam
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Endpoint could not be built or parsed
    #[error("Invalid endpoint '{0}'")]
    InvalidEndpoint(String),

    /// Socket could not be established
    #[error("Connection error: {0}")]
    Connect(String),

    /// Socket task has gone away; the frame was not handed to the socket
    #[error("Socket channel is closed")]
    ChannelClosed,
}
