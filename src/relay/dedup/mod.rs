use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use sha2::{Digest, Sha256};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct DedupRecord {
    fingerprint: String,
    recorded_at: Instant,
}

/// Suppresses an identical message from the same sender inside a time window.
pub struct DedupGuard {
    records: DashMap<String, DedupRecord>,
    window: Duration,
}

/// Hex SHA-256 of the message text.
pub fn fingerprint(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

impl DedupGuard {
    pub fn new(window: Duration) -> Self {
        Self {
            records: DashMap::new(),
            window,
        }
    }

    /// Returns `false` when `text` repeats the sender's last accepted message
    /// within the window. Accepting overwrites the sender's record; a
    /// rejection leaves it untouched.
    pub fn accept(&self, sender: &str, text: &str, now: Instant) -> bool {
        let fingerprint = fingerprint(text);
        let record = DedupRecord {
            fingerprint,
            recorded_at: now,
        };
        match self.records.entry(sender.to_string()) {
            Entry::Occupied(mut occupied) => {
                let prior = occupied.get();
                if prior.fingerprint == record.fingerprint
                    && now.saturating_duration_since(prior.recorded_at) < self.window
                {
                    return false;
                }
                occupied.insert(record);
            }
            Entry::Vacant(vacant) => {
                vacant.insert(record);
            }
        }
        true
    }
}
