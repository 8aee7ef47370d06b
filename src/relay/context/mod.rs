use crate::providers::base::Message;
use dashmap::DashMap;

/// Per-sender bounded conversation history.
///
/// Each sender's sequence lives behind its own shard lock, so an
/// append-then-truncate is atomic for that sender without blocking others.
/// Entries are created on first use and never removed.
pub struct ContextStore {
    turns: DashMap<String, Vec<Message>>,
    max_len: usize,
}

impl ContextStore {
    pub fn new(max_len: usize) -> Self {
        Self {
            turns: DashMap::new(),
            max_len: max_len.max(1),
        }
    }

    /// Append `turn` to the sender's history, dropping the oldest turns past
    /// the cap, and return the resulting history.
    pub fn append_turn(&self, sender: &str, turn: Message) -> Vec<Message> {
        let mut entry = self.turns.entry(sender.to_string()).or_default();
        entry.push(turn);
        if entry.len() > self.max_len {
            let excess = entry.len() - self.max_len;
            entry.drain(..excess);
        }
        entry.clone()
    }

    /// Snapshot of the sender's history (empty if never seen).
    pub fn history(&self, sender: &str) -> Vec<Message> {
        self.turns
            .get(sender)
            .map(|turns| turns.clone())
            .unwrap_or_default()
    }

    pub fn len(&self, sender: &str) -> usize {
        self.turns.get(sender).map_or(0, |turns| turns.len())
    }

    #[cfg(test)]
    pub(crate) fn max_len(&self) -> usize {
        self.max_len
    }

    /// Number of distinct senders with a history.
    #[cfg(test)]
    pub(crate) fn sender_count(&self) -> usize {
        self.turns.len()
    }
}
