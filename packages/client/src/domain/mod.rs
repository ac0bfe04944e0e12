//! Domain layer: value objects, the chat event entity, session state and
//! the message log.

pub mod entity;
pub mod error;
pub mod message_log;
pub mod state;
pub mod value_object;

pub use entity::{ChatEvent, EventKind};
pub use error::ValueObjectError;
pub use message_log::MessageLog;
pub use state::{SessionId, SessionState};
pub use value_object::{MessagePayload, RoomId, Sender, Timestamp};
