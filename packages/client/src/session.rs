//! Connection session: the state machine around one socket.
//!
//! | from            | trigger             | to         | notification      |
//! |-----------------|---------------------|------------|-------------------|
//! | Idle            | connect             | Connecting |                   |
//! | Idle            | connect fails       | Closed     | Disconnected      |
//! | Connecting      | opened              | Open       | Connected         |
//! | Open            | frame               | Open       | MessageAppended   |
//! | Connecting/Open | closed / failed     | Closed     | Disconnected      |
//! | Connecting/Open | close()             | Closing    | Disconnected      |
//! | Closing         | closed / failed     | Closed     |                   |
//! | Closed          | anything            | Closed     |                   |
//!
//! `Disconnected` is produced at most once per session: only on leaving a
//! live state.

use thiserror::Error;

use crate::{
    codec,
    domain::{ChatEvent, RoomId, SessionId, SessionState},
    observer::Notification,
    transport::{EventSender, SocketEvent, SocketHandle, Transport, TransportError, build_endpoint},
};

/// Reasons a frame could not be handed to the socket
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    /// Session is not open; the frame is dropped, never queued
    #[error("Cannot send while session is {0}")]
    NotOpen(SessionState),

    /// Socket handle rejected the frame
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// One connection to one room
pub struct ConnectionSession {
    id: SessionId,
    room: RoomId,
    state: SessionState,
    handle: Option<Box<dyn SocketHandle>>,
}

impl ConnectionSession {
    /// Create an idle session bound to `room`
    pub fn new(id: SessionId, room: RoomId) -> Self {
        Self {
            id,
            room,
            state: SessionState::Idle,
            handle: None,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn room(&self) -> &RoomId {
        &self.room
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Open the socket for this session's room.
    ///
    /// Only valid from Idle. A transport that refuses synchronously
    /// leaves the session Closed and yields `Disconnected`.
    pub fn connect(
        &mut self,
        transport: &dyn Transport,
        base_url: &str,
        events: EventSender,
    ) -> Option<Notification> {
        if self.state != SessionState::Idle {
            tracing::warn!(
                "Session {} ignoring connect in state {}",
                self.id,
                self.state
            );
            return None;
        }

        let endpoint = build_endpoint(base_url, &self.room);
        match transport.connect(&endpoint, self.id, events) {
            Ok(handle) => {
                self.handle = Some(handle);
                self.state = SessionState::Connecting;
                tracing::debug!("Session {} connecting to room '{}'", self.id, self.room);
                None
            }
            Err(e) => {
                tracing::warn!("Session {} could not connect: {}", self.id, e);
                self.state = SessionState::Closed;
                Some(Notification::Disconnected)
            }
        }
    }

    /// Apply one socket event, returning the notification it produces
    pub fn apply(&mut self, event: SocketEvent) -> Option<Notification> {
        match event {
            SocketEvent::Opened => self.on_open(),
            SocketEvent::Frame(raw) => self.on_frame(&raw).map(Notification::MessageAppended),
            SocketEvent::Closed => self.on_closed(),
            SocketEvent::Failed(reason) => self.on_failed(&reason),
        }
    }

    /// Handshake completed
    pub fn on_open(&mut self) -> Option<Notification> {
        if self.state != SessionState::Connecting {
            tracing::debug!("Session {} ignoring open in state {}", self.id, self.state);
            return None;
        }
        self.state = SessionState::Open;
        Some(Notification::Connected)
    }

    /// Decode one inbound frame.
    ///
    /// Returns the event when the session is Open, the frame decodes and
    /// it belongs to this session's room. Everything else is dropped.
    pub fn on_frame(&mut self, raw: &str) -> Option<ChatEvent> {
        if self.state != SessionState::Open {
            tracing::debug!("Session {} dropping frame in state {}", self.id, self.state);
            return None;
        }

        let event = match codec::decode(raw) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!("Session {} dropping malformed frame: {}", self.id, e);
                return None;
            }
        };

        if !event.belongs_to(&self.room) {
            tracing::debug!(
                "Session {} dropping frame for room '{}' (bound to '{}')",
                self.id,
                event.room_id,
                self.room
            );
            return None;
        }

        Some(event)
    }

    /// Socket closed: by the peer, or the ack of a local close
    pub fn on_closed(&mut self) -> Option<Notification> {
        self.finish()
    }

    /// Socket-level error
    pub fn on_failed(&mut self, reason: &str) -> Option<Notification> {
        if !self.state.is_terminal() {
            tracing::warn!("Session {} connection fault: {}", self.id, reason);
        }
        self.finish()
    }

    /// Request a local close
    pub fn close(&mut self) -> Option<Notification> {
        match self.state {
            SessionState::Connecting | SessionState::Open => {
                if let Some(handle) = &self.handle {
                    handle.close();
                }
                self.state = SessionState::Closing;
                Some(Notification::Disconnected)
            }
            SessionState::Idle => {
                self.state = SessionState::Closed;
                None
            }
            SessionState::Closing | SessionState::Closed => None,
        }
    }

    /// Hand a frame to the socket; only permitted while Open
    pub fn send(&self, frame: String) -> Result<(), SendError> {
        match (&self.handle, self.state) {
            (Some(handle), SessionState::Open) => Ok(handle.send(frame)?),
            (_, state) => Err(SendError::NotOpen(state)),
        }
    }

    fn finish(&mut self) -> Option<Notification> {
        let previous = self.state;
        if previous.is_terminal() {
            return None;
        }

        self.state = SessionState::Closed;
        self.handle = None;
        tracing::debug!("Session {} closed (was {})", self.id, previous);

        previous.is_live().then_some(Notification::Disconnected)
    }
}
