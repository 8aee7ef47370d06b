use crate::errors::RelayError;
use crate::providers::base::ProviderMetrics;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tracing::{error, warn};

/// Turns chat-completions HTTP failures into typed [`RelayError`]s.
pub struct ProviderErrorHandler;

impl ProviderErrorHandler {
    /// Parse an API error body into a typed error.
    pub fn parse_api_error(status: u16, error_text: &str) -> RelayError {
        let retryable = matches!(status, 500 | 502 | 503);

        if let Ok(error_json) = serde_json::from_str::<Value>(error_text)
            && let Some(err) = error_json.get("error")
        {
            // OpenRouter nests a numeric `code`, OpenAI a string `type`
            let error_type = err
                .get("type")
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .or_else(|| err.get("code").map(ToString::to_string))
                .unwrap_or_else(|| "unknown".to_string());
            let error_msg = err
                .get("message")
                .and_then(|v| v.as_str())
                .unwrap_or("Unknown error");

            return RelayError::Provider {
                message: format!("API error ({}): {}", error_type, error_msg),
                retryable,
            };
        }

        RelayError::Provider {
            message: format!("API error ({}): {}", status, error_text),
            retryable,
        }
    }

    pub fn rate_limited(retry_after: Option<u64>) -> RelayError {
        if let Some(seconds) = retry_after {
            warn!("Rate limit hit. Retry after {} seconds", seconds);
        } else {
            warn!("Rate limit hit");
        }
        RelayError::RateLimit { retry_after }
    }

    pub fn auth_failed(status: u16, error_text: &str) -> RelayError {
        warn!("Authentication error (status: {}): {}", status, error_text);
        RelayError::Auth(format!(
            "Authentication failed. Please check your API key. Error: {}",
            error_text
        ))
    }

    /// Check an HTTP response for errors (rate limit, auth, generic API errors).
    /// Returns the response body as JSON on success, or a typed error on failure.
    pub async fn check_response(
        resp: reqwest::Response,
        provider: &str,
        metrics: &Arc<Mutex<ProviderMetrics>>,
    ) -> Result<Value, RelayError> {
        let status = resp.status();
        if !status.is_success() {
            if let Ok(mut m) = metrics.lock() {
                m.error_count += 1;
            }
            let retry_after = resp
                .headers()
                .get("retry-after")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok());
            let error_text = resp
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            error!("{} provider returned HTTP {}", provider, status.as_u16());

            return Err(match status.as_u16() {
                429 => Self::rate_limited(retry_after),
                401 | 403 => Self::auth_failed(status.as_u16(), &error_text),
                code => Self::parse_api_error(code, &error_text),
            });
        }

        let json: Value = resp.json().await.map_err(|e| RelayError::Provider {
            message: format!("Failed to parse {} API response: {}", provider, e),
            retryable: false,
        })?;

        // Some gateways report upstream failures inside a 200 body
        if let Some(error_val) = json.get("error") {
            if let Ok(mut m) = metrics.lock() {
                m.error_count += 1;
            }
            error!("{} provider returned an error payload", provider);
            let error_text =
                serde_json::to_string(&serde_json::json!({ "error": error_val }))
                    .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Self::parse_api_error(200, &error_text));
        }

        Ok(json)
    }
}
