//! ClusterTalk realtime chat client.
//!
//! The core is a room-bound session state machine:
//!
//! - `codec`: JSON frame encoding and decoding
//! - `domain`: value objects, chat events, session state and the message log
//! - `session`: the state machine around one socket
//! - `controller`: binds the active room to a session and owns the log
//! - `observer`: notification surface for the UI
//! - `transport`: socket seam and its WebSocket implementation
//!
//! `cli` is the terminal front-end built on top of the core.

pub mod cli;
pub mod codec;
pub mod config;
pub mod controller;
pub mod domain;
pub mod observer;
pub mod session;
pub mod transport;

pub use config::ClientConfig;
pub use controller::{DropReason, RoomController, SendOutcome};
pub use observer::{ChannelObserver, Notification, SessionObserver};
