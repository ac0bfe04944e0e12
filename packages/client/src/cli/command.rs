//! Parsing of lines typed at the prompt.

/// A line typed by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Switch to another room
    Join(String),
    /// Disconnect from the current room
    Leave,
    /// Exit the client
    Quit,
    Help,
    /// Plain text to send to the room
    Say(String),
    /// `/join` without a room
    MissingRoom,
    /// Unrecognized slash command
    Unknown(String),
}

impl Command {
    /// Parse one input line. Lines not starting with `/` are messages.
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let Some(rest) = trimmed.strip_prefix('/') else {
            return Self::Say(line.to_string());
        };

        let mut parts = rest.split_whitespace();
        let name = parts.next().unwrap_or_default();
        match name {
            "join" | "j" => match parts.next() {
                Some(room) => Self::Join(room.to_string()),
                None => Self::MissingRoom,
            },
            "leave" => Self::Leave,
            "quit" | "exit" | "q" => Self::Quit,
            "help" | "h" | "?" => Self::Help,
            other => Self::Unknown(other.to_string()),
        }
    }
}
