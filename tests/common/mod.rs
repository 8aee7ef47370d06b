// Shared test helpers; not all items used by every test binary.
#![allow(unused)]

use async_trait::async_trait;
use smsrelay::bus::OutboundMessage;
use smsrelay::channels::SmsSender;
use smsrelay::config::RelayConfig;
use smsrelay::errors::{RelayError, RelayResult};
use smsrelay::providers::base::{ChatRequest, LLMProvider, LLMResponse, Message};
use smsrelay::relay::ConversationPipeline;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub const ALLOWED: &str = "+15550001";
pub const OTHER_ALLOWED: &str = "+15550002";

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub messages: Vec<Message>,
    pub model: Option<String>,
}

pub struct MockLLMProvider {
    responses: Arc<Mutex<VecDeque<anyhow::Result<LLMResponse>>>>,
    pub calls: Arc<Mutex<Vec<RecordedCall>>>,
    pub default_response: String,
}

impl MockLLMProvider {
    pub fn with_responses(responses: Vec<anyhow::Result<LLMResponse>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::from(responses))),
            calls: Arc::new(Mutex::new(Vec::new())),
            default_response: "Mock response".to_string(),
        }
    }
}

#[async_trait]
impl LLMProvider for MockLLMProvider {
    async fn chat(&self, req: ChatRequest<'_>) -> anyhow::Result<LLMResponse> {
        self.calls.lock().unwrap().push(RecordedCall {
            messages: req.messages,
            model: req.model.map(|s| s.to_string()),
        });

        let response = self.responses.lock().unwrap().pop_front();
        response.unwrap_or_else(|| text_response(&self.default_response))
    }

    fn default_model(&self) -> &str {
        "mock-model"
    }
}

// --- Response builders ---

pub fn text_response(content: &str) -> anyhow::Result<LLMResponse> {
    Ok(LLMResponse {
        content: Some(content.to_string()),
        total_tokens: None,
    })
}

pub fn failed_response(status: u16) -> anyhow::Result<LLMResponse> {
    Err(RelayError::Provider {
        message: format!("HTTP {}", status),
        retryable: status >= 500,
    }
    .into())
}

// --- Recording SMS sender ---

#[derive(Default)]
pub struct RecordingSender {
    pub sent: Arc<Mutex<Vec<OutboundMessage>>>,
    pub fail: bool,
}

impl RecordingSender {
    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl SmsSender for RecordingSender {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(&self, msg: &OutboundMessage) -> RelayResult<()> {
        self.sent.lock().unwrap().push(msg.clone());
        if self.fail {
            return Err(RelayError::Delivery {
                gateway: 1,
                message: "HTTP 500".into(),
            });
        }
        Ok(())
    }
}

pub fn relay_config() -> RelayConfig {
    RelayConfig {
        allow_from: vec![ALLOWED.to_string(), OTHER_ALLOWED.to_string()],
        ..RelayConfig::default()
    }
}

pub fn create_pipeline(
    provider: MockLLMProvider,
    config: &RelayConfig,
) -> (
    Arc<ConversationPipeline>,
    Arc<Mutex<Vec<RecordedCall>>>,
    Arc<RecordingSender>,
) {
    let calls = provider.calls.clone();
    let sms = Arc::new(RecordingSender::default());
    let pipeline = Arc::new(ConversationPipeline::new(
        config,
        Arc::new(provider),
        sms.clone(),
    ));
    (pipeline, calls, sms)
}
