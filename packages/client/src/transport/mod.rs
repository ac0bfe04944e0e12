//! Transport seam between the session state machine and the network.
//!
//! The core never awaits the network. A [`Transport`] returns a
//! [`SocketHandle`] immediately and reports what happens on the socket
//! later as [`TransportEvent`]s, each tagged with the [`SessionId`] of the
//! session that opened it.

mod error;
pub mod websocket;

pub use error::TransportError;
pub use websocket::WebSocketTransport;

use tokio::sync::mpsc;

use crate::domain::{RoomId, SessionId};

/// Something that happened on a socket
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketEvent {
    /// Handshake completed
    Opened,
    /// One complete text frame
    Frame(String),
    /// Socket closed (by the peer, or the ack of a local close)
    Closed,
    /// Socket-level error
    Failed(String),
}

/// A socket event tagged with its originating session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportEvent {
    pub session: SessionId,
    pub event: SocketEvent,
}

impl TransportEvent {
    pub fn new(session: SessionId, event: SocketEvent) -> Self {
        Self { session, event }
    }
}

/// Channel on which transports report socket events
pub type EventSender = mpsc::UnboundedSender<TransportEvent>;

/// Receiving end of [`EventSender`]
pub type EventReceiver = mpsc::UnboundedReceiver<TransportEvent>;

/// Create the channel that carries transport events to the controller
pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Handle to one open (or opening) socket
#[cfg_attr(test, mockall::automock)]
pub trait SocketHandle: Send {
    /// Queue a text frame for sending
    fn send(&self, frame: String) -> Result<(), TransportError>;

    /// Request a local close; completion is reported as [`SocketEvent::Closed`]
    fn close(&self);
}

/// Factory for sockets
pub trait Transport: Send + Sync {
    /// Start connecting to `endpoint` without blocking.
    ///
    /// Events for the new socket are sent on `events` tagged with `session`.
    fn connect(
        &self,
        endpoint: &str,
        session: SessionId,
        events: EventSender,
    ) -> Result<Box<dyn SocketHandle>, TransportError>;
}

/// Build the connection target for a room.
///
/// The room is bound as a query parameter on the base address.
pub fn build_endpoint(base_url: &str, room: &RoomId) -> String {
    let separator = if base_url.contains('?') { '&' } else { '?' };
    format!("{}{}room={}", base_url, separator, room.as_str())
}
