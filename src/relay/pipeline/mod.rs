use crate::bus::InboundMessage;
use crate::channels::SmsSender;
use crate::config::RelayConfig;
use crate::errors::RelayError;
use crate::providers::base::{ChatRequest, LLMProvider, LLMResponse, Message, ProviderMetrics};
use crate::relay::{ContextStore, DedupGuard, ReplyDebouncer, truncate_reply};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Result of running an inbound message through the gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlingOutcome {
    Unauthorized,
    Ignored,
    DuplicateIgnored,
    Accepted,
}

impl HandlingOutcome {
    /// Body text the inbound webhook answers with.
    pub fn response_text(self) -> &'static str {
        match self {
            Self::Unauthorized => "Unauthorized",
            Self::Ignored => "Ignored",
            Self::DuplicateIgnored => "Duplicate ignored",
            Self::Accepted => "OK",
        }
    }
}

/// Orchestrates authorization, dedup, the model call, context updates and
/// the debounced reply.
pub struct ConversationPipeline {
    allow_from: HashSet<String>,
    trigger_prefix: String,
    dedup: DedupGuard,
    context: ContextStore,
    provider: Arc<dyn LLMProvider>,
    debouncer: ReplyDebouncer,
    workers: Arc<Semaphore>,
    max_sms_chars: usize,
    truncation_marker: String,
    fallback_reply: String,
}

impl ConversationPipeline {
    pub fn new(
        config: &RelayConfig,
        provider: Arc<dyn LLMProvider>,
        sms: Arc<dyn SmsSender>,
    ) -> Self {
        Self {
            allow_from: config.allow_from.iter().cloned().collect(),
            trigger_prefix: config.trigger_prefix.clone(),
            dedup: DedupGuard::new(config.repeat_timeout()),
            context: ContextStore::new(config.max_context_len),
            provider,
            debouncer: ReplyDebouncer::new(config.debounce(), sms),
            workers: Arc::new(Semaphore::new(config.max_concurrent_queries.max(1))),
            max_sms_chars: config.max_sms_chars,
            truncation_marker: config.truncation_marker.clone(),
            fallback_reply: config.fallback_reply.clone(),
        }
    }

    /// Run the gates and, on acceptance, queue the model query in the
    /// background. Never waits on the model or on delivery.
    pub fn handle_inbound(self: &Arc<Self>, msg: InboundMessage) -> HandlingOutcome {
        if !self.allow_from.contains(&msg.sender) {
            warn!("Rejected message from non-allowed sender {}", msg.sender);
            return HandlingOutcome::Unauthorized;
        }

        let Some(prompt) = extract_prompt(&msg.content, &self.trigger_prefix) else {
            debug!("Ignoring message from {} without trigger prefix", msg.sender);
            return HandlingOutcome::Ignored;
        };

        if !self.dedup.accept(&msg.sender, &msg.content, Instant::now()) {
            info!("Duplicate message from {} ignored", msg.sender);
            return HandlingOutcome::DuplicateIgnored;
        }

        info!(
            "Accepted prompt from {} ({} chars)",
            msg.sender,
            prompt.chars().count()
        );
        let pipeline = Arc::clone(self);
        let sender = msg.sender;
        tokio::spawn(async move {
            let Ok(_permit) = pipeline.workers.clone().acquire_owned().await else {
                debug!("Worker pool closed, dropping prompt from {}", sender);
                return;
            };
            let reply = pipeline.query_model(&sender, &prompt).await;
            if pipeline.workers.is_closed() {
                debug!("Relay stopped, discarding reply for {}", sender);
                return;
            }
            pipeline.debouncer.schedule(&sender, reply);
        });

        HandlingOutcome::Accepted
    }

    /// Ask the model with the sender's full context. Always yields text to
    /// send: the reply (truncated to SMS size) or the fallback. Only genuine
    /// model replies are recorded in the context.
    pub async fn query_model(&self, sender: &str, prompt: &str) -> String {
        let history = self.context.append_turn(sender, Message::user(prompt));
        let req = ChatRequest {
            messages: history,
            model: None,
        };

        match self.provider.chat(req).await {
            Ok(LLMResponse {
                content: Some(reply),
                ..
            }) => {
                self.context
                    .append_turn(sender, Message::assistant(reply.clone()));
                debug!(
                    "Model replied to {} with {} chars",
                    sender,
                    reply.chars().count()
                );
                truncate_reply(&reply, self.max_sms_chars, &self.truncation_marker)
            }
            Ok(_) => {
                warn!("Model returned an empty reply for {}", sender);
                self.fallback_reply.clone()
            }
            Err(e) => {
                let transient = e
                    .downcast_ref::<RelayError>()
                    .is_none_or(RelayError::is_retryable);
                if transient {
                    warn!("Model query for {} failed: {:#}", sender, e);
                } else {
                    error!("Model query for {} failed permanently: {:#}", sender, e);
                }
                self.fallback_reply.clone()
            }
        }
    }

    pub fn context(&self) -> &ContextStore {
        &self.context
    }

    /// Model the backend is queried with.
    pub fn model(&self) -> &str {
        self.provider.default_model()
    }

    pub fn provider_metrics(&self) -> ProviderMetrics {
        self.provider.metrics()
    }

    pub fn pending_replies(&self) -> usize {
        self.debouncer.pending_count()
    }

    /// Stop taking queued work and drop undelivered replies.
    pub fn shutdown(&self) {
        self.workers.close();
        let dropped = self.debouncer.cancel_all();
        info!("Relay pipeline stopped ({} pending replies dropped)", dropped);
    }
}

/// Prompt text after a case-insensitive `prefix` match on the trimmed
/// message, or `None` if the prefix is absent.
pub fn extract_prompt(text: &str, prefix: &str) -> Option<String> {
    let trimmed = text.trim();
    let prefix_chars = prefix.chars().count();
    let split = trimmed
        .char_indices()
        .nth(prefix_chars)
        .map_or(trimmed.len(), |(idx, _)| idx);
    let (head, rest) = trimmed.split_at(split);
    if head.chars().count() < prefix_chars || head.to_lowercase() != prefix.to_lowercase() {
        return None;
    }
    Some(rest.trim().to_string())
}
