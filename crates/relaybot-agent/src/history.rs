//! Per-channel conversation history, process lifetime only.
//!
//! Each channel keeps at most `2 * max_turns` turns (user + assistant pairs).
//! Appending past the bound evicts from the front, so the retained window is
//! always the most recent turns in arrival order.

use std::collections::VecDeque;

use dashmap::DashMap;
use tracing::debug;

use crate::turn::{Role, Turn};

pub struct ConversationStore {
    max_turns: usize,
    channels: DashMap<String, VecDeque<Turn>>,
}

impl ConversationStore {
    /// `max_turns` is clamped to at least one pair.
    pub fn new(max_turns: usize) -> Self {
        Self {
            max_turns: max_turns.max(1),
            channels: DashMap::new(),
        }
    }

    /// Maximum number of turns held per channel.
    pub fn capacity(&self) -> usize {
        self.max_turns * 2
    }

    /// Append a turn and return the channel's history as it stands afterwards.
    pub fn append(&self, channel_id: &str, role: Role, content: impl Into<String>) -> Vec<Turn> {
        let capacity = self.capacity();
        let mut history = self.channels.entry(channel_id.to_string()).or_default();

        history.push_back(Turn {
            role,
            content: content.into(),
        });
        let overflow = history.len().saturating_sub(capacity);
        if overflow > 0 {
            history.drain(..overflow);
            debug!(channel = channel_id, evicted = overflow, "history window full");
        }

        history.iter().cloned().collect()
    }

    /// Current history for a channel; empty when the channel was never seen.
    pub fn get(&self, channel_id: &str) -> Vec<Turn> {
        self.channels
            .get(channel_id)
            .map(|h| h.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Drop a channel's history. Returns how many turns were removed.
    pub fn clear(&self, channel_id: &str) -> usize {
        self.channels
            .remove(channel_id)
            .map(|(_, h)| h.len())
            .unwrap_or(0)
    }

    pub fn len(&self, channel_id: &str) -> usize {
        self.channels.get(channel_id).map(|h| h.len()).unwrap_or(0)
    }
}
