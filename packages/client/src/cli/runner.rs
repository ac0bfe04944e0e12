//! Client event loop.
//!
//! A single task owns the [`RoomController`] and selects over transport
//! events and lines typed by the user, so every state change is applied
//! one at a time. There is no automatic reconnection: after a disconnect
//! the user joins again explicitly.

use std::{sync::Arc, time::Duration};

use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::{mpsc, oneshot};

use clustertalk_shared::time::get_unix_timestamp;

use crate::{
    config::ClientConfig,
    controller::{DropReason, RoomController, SendOutcome},
    domain::RoomId,
    observer::ObserverId,
    transport::{EventReceiver, SocketEvent, WebSocketTransport, event_channel},
};

use super::{
    command::Command, error::ClientError, formatter::MessageFormatter, terminal::TerminalObserver,
    ui::redisplay_prompt,
};

/// Upper bound on waiting for the close handshake when exiting
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// Run the terminal client, starting in `room`
pub async fn run_client(
    config: ClientConfig,
    room: RoomId,
) -> Result<(), Box<dyn std::error::Error>> {
    let me = config.sender.as_str().to_string();
    let input_rx = spawn_readline(me.clone()).await?;

    let (events_tx, mut events_rx) = event_channel();
    let mut controller = RoomController::new(config, Arc::new(WebSocketTransport::new()), events_tx);
    let terminal = controller.subscribe(Arc::new(TerminalObserver::new(me.clone())));

    print!("{}", MessageFormatter::format_joining(room.as_str(), &me));
    controller.join(room);

    drive(&mut controller, &mut events_rx, input_rx, &me).await;

    shutdown(&mut controller, terminal, &mut events_rx).await;
    tracing::info!("Client session ended");
    Ok(())
}

/// Process transport events and user input until the user quits
async fn drive(
    controller: &mut RoomController,
    events_rx: &mut EventReceiver,
    mut input_rx: mpsc::UnboundedReceiver<String>,
    me: &str,
) {
    loop {
        tokio::select! {
            Some(event) = events_rx.recv() => controller.handle_event(event),
            line = input_rx.recv() => {
                let Some(line) = line else {
                    // Readline thread ended (Ctrl+C / Ctrl+D)
                    break;
                };
                if !handle_line(controller, &line, me) {
                    break;
                }
            }
        }
    }
}

/// Close the current session and wait for the close ack.
///
/// The terminal observer is detached first so no rejoin hint is printed
/// while exiting. Waiting keeps the runtime alive until the socket task
/// has sent its close frame.
async fn shutdown(
    controller: &mut RoomController,
    terminal: ObserverId,
    events_rx: &mut EventReceiver,
) {
    controller.unsubscribe(terminal);

    let Some(closing) = controller.session_id() else {
        return;
    };
    let was_live = controller.state().is_live();
    controller.leave();
    if !was_live {
        return;
    }

    let ack = async {
        while let Some(event) = events_rx.recv().await {
            if event.session == closing
                && matches!(event.event, SocketEvent::Closed | SocketEvent::Failed(_))
            {
                break;
            }
        }
    };
    if tokio::time::timeout(SHUTDOWN_GRACE, ack).await.is_err() {
        tracing::debug!("Session {} did not acknowledge close in time", closing);
    }
}

/// Apply one input line; returns `false` when the user asked to quit
fn handle_line(controller: &mut RoomController, line: &str, me: &str) -> bool {
    match Command::parse(line) {
        Command::Quit => return false,
        Command::Help => print!("{}", MessageFormatter::format_help()),
        Command::Leave => {
            let active_room = controller
                .session_id()
                .and(controller.room())
                .map(|r| r.as_str().to_string());
            controller.leave();
            if let Some(room) = active_room {
                print!("{}", MessageFormatter::format_left(&room));
            }
        }
        Command::Join(room) => match RoomId::new(room) {
            Ok(room) => {
                print!("{}", MessageFormatter::format_joining(room.as_str(), me));
                controller.join(room);
            }
            Err(e) => print!("{}", MessageFormatter::format_command_error(&e.to_string())),
        },
        Command::MissingRoom => {
            print!("{}", MessageFormatter::format_command_error("Usage: /join <room>"));
        }
        Command::Unknown(name) => {
            let message = format!("Unknown command '/{}' (try /help)", name);
            print!("{}", MessageFormatter::format_command_error(&message));
        }
        Command::Say(text) => match controller.send_message(&text) {
            SendOutcome::Sent => {
                print!("{}", MessageFormatter::format_sent_confirmation(get_unix_timestamp()));
            }
            SendOutcome::Dropped(DropReason::EmptyText) => {}
            SendOutcome::Dropped(reason) => print!("{}", MessageFormatter::format_dropped(&reason)),
        },
    }
    redisplay_prompt(me);
    true
}

/// Start the blocking readline thread and return the channel of typed lines
async fn spawn_readline(me: String) -> Result<mpsc::UnboundedReceiver<String>, ClientError> {
    let (input_tx, input_rx) = mpsc::unbounded_channel::<String>();
    let (ready_tx, ready_rx) = oneshot::channel::<Result<(), String>>();

    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => {
                let _ = ready_tx.send(Ok(()));
                rl
            }
            Err(e) => {
                let _ = ready_tx.send(Err(e.to_string()));
                return;
            }
        };

        let prompt = format!("{}> ", me);

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            // Channel closed, exit thread
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    match ready_rx.await {
        Ok(Ok(())) => Ok(input_rx),
        Ok(Err(e)) => Err(ClientError::Readline(e)),
        Err(_) => Err(ClientError::Readline(
            "readline thread exited during startup".to_string(),
        )),
    }
}
