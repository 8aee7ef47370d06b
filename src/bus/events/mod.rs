use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A message received from a phone. Immutable once received.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    pub sender: String,
    pub content: String,
    pub received_at: DateTime<Utc>,
}

impl InboundMessage {
    pub fn new(sender: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            content: content.into(),
            received_at: Utc::now(),
        }
    }
}

/// A reply ready to be handed to an SMS gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub to_number: String,
    pub content: String,
}

impl OutboundMessage {
    pub fn new(to_number: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            to_number: to_number.into(),
            content: content.into(),
        }
    }
}
