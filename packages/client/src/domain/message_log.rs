//! Append-only, insertion-ordered log of received chat events.

use super::entity::ChatEvent;

/// Ordered log of the events received for the active room.
///
/// Events are only ever appended during a room's lifetime; the whole log is
/// replaced with an empty one when the bound room changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageLog {
    events: Vec<ChatEvent>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event at the end of the log
    pub fn append(&mut self, event: ChatEvent) {
        self.events.push(event);
    }

    /// Replace the log with an empty sequence
    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChatEvent> {
        self.events.iter()
    }

    /// Owned copy of the current contents, detached from later appends
    pub fn snapshot(&self) -> Vec<ChatEvent> {
        self.events.clone()
    }

    pub fn last(&self) -> Option<&ChatEvent> {
        self.events.last()
    }
}

impl<'a> IntoIterator for &'a MessageLog {
    type Item = &'a ChatEvent;
    type IntoIter = std::slice::Iter<'a, ChatEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
