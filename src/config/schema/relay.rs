use serde::{Deserialize, Serialize};

fn default_trigger_prefix() -> String {
    "Chat".to_string()
}

fn default_max_context_len() -> usize {
    10
}

fn default_repeat_timeout_secs() -> u64 {
    30
}

fn default_debounce_millis() -> u64 {
    2000
}

fn default_max_sms_chars() -> usize {
    2400
}

fn default_truncation_marker() -> String {
    "\n[...truncated]".to_string()
}

fn default_fallback_reply() -> String {
    "\u{26a0}\u{fe0f} The assistant is currently unavailable. Try again later.".to_string()
}

fn default_max_concurrent_queries() -> usize {
    32
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Phone numbers allowed to talk to the model. Compared verbatim.
    #[serde(default, rename = "allowFrom")]
    pub allow_from: Vec<String>,
    #[serde(default = "default_trigger_prefix", rename = "triggerPrefix")]
    pub trigger_prefix: String,
    #[serde(default = "default_max_context_len", rename = "maxContextLen")]
    pub max_context_len: usize,
    #[serde(default = "default_repeat_timeout_secs", rename = "repeatTimeoutSecs")]
    pub repeat_timeout_secs: u64,
    #[serde(default = "default_debounce_millis", rename = "debounceMillis")]
    pub debounce_millis: u64,
    #[serde(default = "default_max_sms_chars", rename = "maxSmsChars")]
    pub max_sms_chars: usize,
    #[serde(default = "default_truncation_marker", rename = "truncationMarker")]
    pub truncation_marker: String,
    /// Sent instead of a model reply when the backend fails.
    #[serde(default = "default_fallback_reply", rename = "fallbackReply")]
    pub fallback_reply: String,
    #[serde(
        default = "default_max_concurrent_queries",
        rename = "maxConcurrentQueries"
    )]
    pub max_concurrent_queries: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            allow_from: Vec::new(),
            trigger_prefix: default_trigger_prefix(),
            max_context_len: default_max_context_len(),
            repeat_timeout_secs: default_repeat_timeout_secs(),
            debounce_millis: default_debounce_millis(),
            max_sms_chars: default_max_sms_chars(),
            truncation_marker: default_truncation_marker(),
            fallback_reply: default_fallback_reply(),
            max_concurrent_queries: default_max_concurrent_queries(),
        }
    }
}

impl RelayConfig {
    pub fn repeat_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.repeat_timeout_secs)
    }

    pub fn debounce(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.debounce_millis)
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}
