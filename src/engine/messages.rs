//! Bounded log of in-game notifications

use std::collections::VecDeque;

/// One notification, e.g. a dialog line or a quest update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub sender: String,
    pub text: String,
}

/// Newest-first ring of messages
#[derive(Debug, Clone)]
pub struct MessageLog {
    entries: VecDeque<Message>,
    capacity: usize,
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::new(50)
    }
}

impl MessageLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, sender: impl Into<String>, text: impl Into<String>) {
        let message = Message {
            sender: sender.into(),
            text: text.into(),
        };
        tracing::info!(sender = %message.sender, "{}", message.text);
        self.entries.push_front(message);
        if self.entries.len() > self.capacity {
            self.entries.pop_back();
        }
    }

    pub fn latest(&self) -> Option<&Message> {
        self.entries.front()
    }

    /// Newest first
    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
