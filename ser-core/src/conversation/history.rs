//! Bounded Message History

use serde::Serialize;
use std::collections::VecDeque;

use crate::llm::Message;

/// Conversation turns in insertion order, bounded by an optional capacity.
///
/// Pushing past capacity evicts the oldest turn. The system instruction is
/// not stored here; the client prepends it to every request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct History {
    turns: VecDeque<Message>,
    capacity: Option<usize>,
}

impl History {
    /// Create a history holding at most `capacity` turns (`None` = unbounded)
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            turns: VecDeque::new(),
            capacity,
        }
    }

    /// Create an unbounded history
    pub fn unbounded() -> Self {
        Self::new(None)
    }

    /// Append a turn, evicting from the front while over capacity
    pub fn push(&mut self, message: Message) {
        self.turns.push_back(message);
        self.evict();
    }

    fn evict(&mut self) {
        if let Some(capacity) = self.capacity {
            while self.turns.len() > capacity {
                self.turns.pop_front();
            }
        }
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Change the capacity; shrinking keeps the newest turns
    pub fn set_capacity(&mut self, capacity: Option<usize>) {
        self.capacity = capacity;
        self.evict();
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.turns.iter()
    }

    pub fn last(&self) -> Option<&Message> {
        self.turns.back()
    }

    /// Snapshot of all turns, oldest first
    pub fn to_vec(&self) -> Vec<Message> {
        self.turns.iter().cloned().collect()
    }

    /// Outbound message list: the system turn (if any) followed by history
    pub fn to_messages(&self, system_prompt: Option<&str>) -> Vec<Message> {
        let mut messages = Vec::with_capacity(self.turns.len() + 1);
        if let Some(system) = system_prompt {
            messages.push(Message::system(system));
        }
        messages.extend(self.turns.iter().cloned());
        messages
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.turns.clear();
    }
}
