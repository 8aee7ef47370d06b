use crate::bus::OutboundMessage;
use crate::errors::RelayResult;
use async_trait::async_trait;

/// Outbound SMS delivery. Implementations pick the gateway themselves.
#[async_trait]
pub trait SmsSender: Send + Sync {
    fn name(&self) -> &str;

    async fn send(&self, msg: &OutboundMessage) -> RelayResult<()>;
}
