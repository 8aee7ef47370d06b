use serde::{Deserialize, Serialize};

pub(crate) const DEFAULT_MODEL: &str = "deepseek/deepseek-r1:free";
pub(crate) const DEFAULT_PROVIDER_API_BASE: &str = "https://openrouter.ai/api/v1/chat/completions";
pub(crate) const DEFAULT_SMS_API_BASE: &str = "https://api.telerivet.com/v1";

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_provider_api_base() -> String {
    DEFAULT_PROVIDER_API_BASE.to_string()
}

fn default_sms_api_base() -> String {
    DEFAULT_SMS_API_BASE.to_string()
}

/// OpenAI-compatible chat-completions backend.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, rename = "apiKey")]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Full chat-completions URL, not just the host.
    #[serde(default = "default_provider_api_base", rename = "apiBase")]
    pub api_base: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            api_base: default_provider_api_base(),
        }
    }
}

redact_debug!(ProviderConfig, redact(api_key), model, api_base,);

/// One outbound SMS channel. Immutable after startup.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsGatewayConfig {
    #[serde(default, rename = "apiKey")]
    pub api_key: String,
    #[serde(default, rename = "projectId")]
    pub project_id: String,
    #[serde(default, rename = "phoneId")]
    pub phone_id: String,
}

redact_debug!(SmsGatewayConfig, redact(api_key), project_id, phone_id,);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmsConfig {
    #[serde(default = "default_sms_api_base", rename = "apiBase")]
    pub api_base: String,
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            api_base: default_sms_api_base(),
        }
    }
}
