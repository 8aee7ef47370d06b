use crate::providers::base::{ChatRequest, LLMProvider, LLMResponse, ProviderMetrics};
use crate::providers::errors::ProviderErrorHandler;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use std::sync::Mutex;

/// Client for any OpenAI-compatible `/chat/completions` endpoint
/// (OpenRouter by default).
pub struct OpenAIProvider {
    api_key: String,
    default_model: String,
    base_url: String,
    provider_name: String,
    client: Client,
    metrics: std::sync::Arc<Mutex<ProviderMetrics>>,
}

impl OpenAIProvider {
    pub fn with_config(
        api_key: String,
        default_model: String,
        base_url: String,
        provider_name: String,
    ) -> Self {
        Self {
            api_key,
            default_model,
            base_url,
            provider_name,
            client: crate::providers::provider_http_client(),
            metrics: std::sync::Arc::new(Mutex::new(ProviderMetrics::default())),
        }
    }

    pub fn from_config(config: &crate::config::ProviderConfig) -> Self {
        Self::with_config(
            config.api_key.clone(),
            config.model.clone(),
            config.api_base.clone(),
            provider_name_for(&config.api_base),
        )
    }

    fn parse_response(json: &Value) -> Result<LLMResponse> {
        let choice = json["choices"]
            .as_array()
            .and_then(|arr| arr.first())
            .context("No choices in chat completion response")?;

        let content = choice["message"]["content"]
            .as_str()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(LLMResponse {
            content,
            total_tokens: json
                .get("usage")
                .and_then(|u| u.get("total_tokens"))
                .and_then(Value::as_u64),
        })
    }
}

/// Human-readable backend name for log lines.
fn provider_name_for(base_url: &str) -> String {
    if base_url.contains("openrouter.ai") {
        "OpenRouter".to_string()
    } else if base_url.contains("api.openai.com") {
        "OpenAI".to_string()
    } else {
        "chat-completions".to_string()
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    async fn chat(&self, req: ChatRequest<'_>) -> Result<LLMResponse> {
        let payload = json!({
            "model": req.model.unwrap_or(&self.default_model),
            "messages": req.messages,
            "stream": false,
        });

        let resp = self
            .client
            .post(&self.base_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .context(format!(
                "Failed to send request to {} API",
                self.provider_name
            ))?;

        let json =
            ProviderErrorHandler::check_response(resp, &self.provider_name, &self.metrics).await?;

        let response = Self::parse_response(&json)?;

        if let Ok(mut metrics) = self.metrics.lock() {
            metrics.request_count += 1;
            if let Some(tokens) = response.total_tokens {
                metrics.token_count += tokens;
            }
        }

        Ok(response)
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    fn metrics(&self) -> ProviderMetrics {
        self.metrics
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }
}
