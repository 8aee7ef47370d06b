use crate::bus::OutboundMessage;
use crate::channels::base::SmsSender;
use crate::config::SmsGatewayConfig;
use crate::errors::{RelayError, RelayResult};
use crate::relay::GatewaySelector;
use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, error, info};

/// Sends SMS through Telerivet projects, rotating across the configured
/// gateways on every message.
pub struct TelerivetSender {
    gateways: GatewaySelector<SmsGatewayConfig>,
    api_base: String,
    client: reqwest::Client,
}

impl TelerivetSender {
    pub fn new(gateways: Vec<SmsGatewayConfig>, api_base: impl Into<String>) -> RelayResult<Self> {
        let gateways = GatewaySelector::new(gateways).ok_or_else(|| {
            RelayError::Config("at least one SMS gateway must be configured".to_string())
        })?;
        Ok(Self {
            gateways,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::builder()
                .connect_timeout(std::time::Duration::from_secs(10))
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        })
    }

    pub fn gateway_count(&self) -> usize {
        self.gateways.len()
    }

    fn send_url(&self, gateway: &SmsGatewayConfig) -> String {
        format!(
            "{}/projects/{}/messages/send",
            self.api_base, gateway.project_id
        )
    }
}

#[async_trait]
impl SmsSender for TelerivetSender {
    fn name(&self) -> &str {
        "telerivet"
    }

    async fn send(&self, msg: &OutboundMessage) -> RelayResult<()> {
        let (index, gateway) = self.gateways.next_with_index();
        let position = index + 1;
        debug!(
            "telerivet: sending {} chars to {} via gateway {}",
            msg.content.chars().count(),
            msg.to_number,
            position
        );

        let payload = json!({
            "to_number": msg.to_number,
            "content": msg.content,
            "phone_id": gateway.phone_id,
        });

        let response = self
            .client
            .post(self.send_url(gateway))
            .basic_auth(&gateway.api_key, Some(""))
            .json(&payload)
            .send()
            .await
            .map_err(|e| RelayError::Delivery {
                gateway: position,
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(
                "telerivet: gateway {} rejected message to {} ({})",
                position, msg.to_number, status
            );
            return Err(RelayError::Delivery {
                gateway: position,
                message: format!("HTTP {}: {}", status, body),
            });
        }

        info!("telerivet: sent reply to {} via gateway {}", msg.to_number, position);
        Ok(())
    }
}
