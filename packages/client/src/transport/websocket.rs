//! WebSocket transport built on tokio-tungstenite.
//!
//! Each socket is driven by one spawned task that multiplexes inbound
//! frames and outbound commands. The task is the only owner of the
//! stream; the handle talks to it through an unbounded channel.

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{
        client::IntoClientRequest,
        handshake::client::Request,
        protocol::{CloseFrame, Message, frame::coding::CloseCode},
    },
};

use crate::domain::SessionId;

use super::{EventSender, SocketEvent, SocketHandle, Transport, TransportError, TransportEvent};

/// Close reason sent on a local close
const CLOSE_REASON: &str = "User Exit";

/// Command from a handle to its socket task
#[derive(Debug)]
enum SocketCommand {
    Send(String),
    Close,
}

/// Transport that opens real WebSocket connections
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketTransport;

impl WebSocketTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Transport for WebSocketTransport {
    fn connect(
        &self,
        endpoint: &str,
        session: SessionId,
        events: EventSender,
    ) -> Result<Box<dyn SocketHandle>, TransportError> {
        let request = endpoint
            .into_client_request()
            .map_err(|_| TransportError::InvalidEndpoint(endpoint.to_string()))?;

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        runtime.spawn(run_socket(request, session, events, command_rx));

        tracing::debug!("Session {} connecting to {}", session, endpoint);
        Ok(Box::new(WebSocketHandle {
            commands: command_tx,
        }))
    }
}

/// Handle to a socket task
struct WebSocketHandle {
    commands: mpsc::UnboundedSender<SocketCommand>,
}

impl SocketHandle for WebSocketHandle {
    fn send(&self, frame: String) -> Result<(), TransportError> {
        self.commands
            .send(SocketCommand::Send(frame))
            .map_err(|_| TransportError::ChannelClosed)
    }

    fn close(&self) {
        // The task may already have exited after a peer close
        let _ = self.commands.send(SocketCommand::Close);
    }
}

/// Drive one socket until it closes, reporting events for `session`
async fn run_socket(
    request: Request,
    session: SessionId,
    events: EventSender,
    mut commands: mpsc::UnboundedReceiver<SocketCommand>,
) {
    let report = |event: SocketEvent| {
        // The controller may have shut down; nothing left to notify
        let _ = events.send(TransportEvent::new(session, event));
    };

    let ws_stream = tokio::select! {
        result = connect_async(request) => match result {
            Ok((ws_stream, _response)) => ws_stream,
            Err(e) => {
                tracing::warn!("Session {} failed to connect: {}", session, e);
                report(SocketEvent::Failed(e.to_string()));
                return;
            }
        },
        command = wait_for_close(&mut commands) => {
            tracing::debug!("Session {} closed before the handshake ({:?})", session, command);
            report(SocketEvent::Closed);
            return;
        }
    };

    tracing::info!("Session {} connected", session);
    report(SocketEvent::Opened);

    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            message = read.next() => match message {
                Some(Ok(Message::Text(text))) => {
                    report(SocketEvent::Frame(text.as_str().to_owned()));
                }
                Some(Ok(Message::Binary(data))) => {
                    tracing::debug!("Session {} ignoring binary frame ({} bytes)", session, data.len());
                }
                Some(Ok(Message::Close(_))) | None => {
                    tracing::info!("Session {}: server closed the connection", session);
                    report(SocketEvent::Closed);
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::warn!("Session {} read error: {}", session, e);
                    report(SocketEvent::Failed(e.to_string()));
                    break;
                }
            },
            command = commands.recv() => match command {
                Some(SocketCommand::Send(frame)) => {
                    if let Err(e) = write.send(Message::Text(frame.into())).await {
                        tracing::warn!("Session {} failed to send frame: {}", session, e);
                        report(SocketEvent::Failed(e.to_string()));
                        break;
                    }
                }
                Some(SocketCommand::Close) | None => {
                    let frame = CloseFrame {
                        code: CloseCode::Normal,
                        reason: CLOSE_REASON.into(),
                    };
                    if let Err(e) = write.send(Message::Close(Some(frame))).await {
                        tracing::debug!("Session {} close handshake failed: {}", session, e);
                    }
                    tracing::info!("Session {} closed locally", session);
                    report(SocketEvent::Closed);
                    break;
                }
            },
        }
    }
}

/// Resolve once a close is requested (or every handle is gone) before the
/// handshake finishes. Sends queued while connecting are discarded.
async fn wait_for_close(commands: &mut mpsc::UnboundedReceiver<SocketCommand>) -> Option<()> {
    loop {
        match commands.recv().await {
            Some(SocketCommand::Send(_)) => {
                tracing::debug!("Discarding frame queued before the socket opened");
            }
            Some(SocketCommand::Close) => return Some(()),
            None => return None,
        }
    }
}
