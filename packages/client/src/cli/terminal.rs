//! Observer that renders notifications on the terminal.

use crate::{domain::ChatEvent, observer::SessionObserver};

use super::{formatter::MessageFormatter, ui::redisplay_prompt};

/// Prints connection changes and received messages
pub struct TerminalObserver {
    me: String,
}

impl TerminalObserver {
    pub fn new(me: impl Into<String>) -> Self {
        Self { me: me.into() }
    }
}

impl SessionObserver for TerminalObserver {
    fn on_connected(&self) {
        print!("{}", MessageFormatter::format_connected());
        redisplay_prompt(&self.me);
    }

    fn on_message_appended(&self, event: &ChatEvent) {
        print!("{}", MessageFormatter::format_chat_message(event, &self.me));
        redisplay_prompt(&self.me);
    }

    fn on_disconnected(&self) {
        print!("{}", MessageFormatter::format_disconnected());
        redisplay_prompt(&self.me);
    }
}
