//! Message formatting utilities for terminal display.

use clustertalk_shared::time::timestamp_to_jst_rfc3339;

use crate::{controller::DropReason, domain::ChatEvent};

const RULE: &str = "------------------------------------------------------------";
const BANNER: &str = "============================================================";

/// Message formatter for terminal display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format the banner shown when a room is joined
    ///
    /// # Arguments
    ///
    /// * `room` - The room being joined
    /// * `sender` - The local user's display name
    pub fn format_joining(room: &str, sender: &str) -> String {
        format!(
            "\n{}\nJoining room '{}' as '{}'...\n{}\n",
            BANNER, room, sender, BANNER
        )
    }

    /// Format the notice shown when the session opens
    pub fn format_connected() -> String {
        "\n✓ Connected. Type messages and press Enter to send. /help for commands.\n".to_string()
    }

    /// Format the notice shown when the session is closed or fails
    pub fn format_disconnected() -> String {
        "\n✗ Disconnected. Type /join <room> to connect again.\n".to_string()
    }

    /// Format a chat message
    ///
    /// # Arguments
    ///
    /// * `event` - The received chat event
    /// * `me` - The local user's display name (to mark own messages)
    ///
    /// The mark only appears when the server echoes the sender as supplied;
    /// servers that rewrite senders never match `me`.
    pub fn format_chat_message(event: &ChatEvent, me: &str) -> String {
        let is_me = event.sender.as_str() == me;
        let me_suffix = if is_me { " (me)" } else { "" };
        let timestamp_str = timestamp_to_jst_rfc3339(event.timestamp.value());
        format!(
            "\n\n{}\n\
             [{}] @{}{}: {}\n\
             sent at {}\n\
             {}\n",
            RULE,
            event.room_id.as_str(),
            event.sender.as_str(),
            me_suffix,
            event.payload.as_str(),
            timestamp_str,
            RULE
        )
    }

    /// Format a confirmation message after sending
    ///
    /// # Arguments
    ///
    /// * `sent_at` - Unix timestamp when the message was sent (seconds)
    pub fn format_sent_confirmation(sent_at: i64) -> String {
        let timestamp_str = timestamp_to_jst_rfc3339(sent_at);
        format!("sent at {}\n", timestamp_str)
    }

    /// Format the notice shown when an outbound message was not sent
    pub fn format_dropped(reason: &DropReason) -> String {
        let detail = match reason {
            DropReason::EmptyText => "message is empty".to_string(),
            DropReason::NoRoom => "not in a room (use /join <room>)".to_string(),
            DropReason::NotOpen(state) => format!("not connected (session is {})", state),
            DropReason::Encode(e) => e.to_string(),
            DropReason::Transport(e) => e.to_string(),
        };
        format!("\n! Message not sent: {}\n", detail)
    }

    /// Format the notice shown after leaving a room
    pub fn format_left(room: &str) -> String {
        format!("\n- Left room '{}'\n", room)
    }

    /// Format an error for a command the user typed
    pub fn format_command_error(message: &str) -> String {
        format!("\n! {}\n", message)
    }

    /// Format the command help
    pub fn format_help() -> String {
        "\nCommands:\n  \
         /join <room>  switch to another room\n  \
         /leave        disconnect from the current room\n  \
         /quit         exit\n  \
         /help         show this help\n"
            .to_string()
    }
}
