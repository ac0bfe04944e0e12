//! Terminal front-end for the chat client.

mod command;
mod error;
mod formatter;
mod runner;
mod terminal;
mod ui;

pub use command::Command;
pub use error::ClientError;
pub use formatter::MessageFormatter;
pub use runner::run_client;
pub use terminal::TerminalObserver;
