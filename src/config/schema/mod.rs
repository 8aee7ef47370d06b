use serde::{Deserialize, Serialize};
use tracing::warn;

/// Generates a `Debug` impl that redacts secret fields.
///
/// Field specifiers:
/// - `field_name`            printed normally via `&self.field_name`
/// - `redact(field_name)`    `String` field, shows `[empty]` or `[REDACTED]`
macro_rules! redact_debug {
    (@field $builder:ident, $self:ident, redact($field:ident)) => {
        $builder.field(
            stringify!($field),
            &if $self.$field.is_empty() {
                "[empty]"
            } else {
                "[REDACTED]"
            },
        );
    };
    (@field $builder:ident, $self:ident, $field:ident) => {
        $builder.field(stringify!($field), &$self.$field);
    };

    (@fields $builder:ident, $self:ident,) => {};
    (@fields $builder:ident, $self:ident, redact($field:ident), $($rest:tt)*) => {
        redact_debug!(@field $builder, $self, redact($field));
        redact_debug!(@fields $builder, $self, $($rest)*);
    };
    (@fields $builder:ident, $self:ident, $field:ident, $($rest:tt)*) => {
        redact_debug!(@field $builder, $self, $field);
        redact_debug!(@fields $builder, $self, $($rest)*);
    };

    ($struct_name:ident, $($fields:tt)*) => {
        impl std::fmt::Debug for $struct_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let mut builder = f.debug_struct(stringify!($struct_name));
                redact_debug!(@fields builder, self, $($fields)*);
                builder.finish()
            }
        }
    };
}

// Submodules are declared after the macro so they can use `redact_debug!`
mod providers;
mod relay;

pub use providers::*;
pub use relay::*;

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Outbound SMS gateways, used round-robin in list order.
    #[serde(default)]
    pub gateways: Vec<SmsGatewayConfig>,
    #[serde(default)]
    pub sms: SmsConfig,
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Validate configuration values
    pub fn validate(&self) -> Result<(), crate::errors::RelayError> {
        self.validate_provider()?;
        self.validate_gateways()?;
        self.validate_relay()?;
        self.validate_server()?;
        Ok(())
    }

    fn validate_provider(&self) -> Result<(), crate::errors::RelayError> {
        use crate::errors::RelayError;

        if self.provider.api_key.is_empty() {
            return Err(RelayError::Config(
                "provider.apiKey is required (or set OPENROUTER_API_KEY)".into(),
            ));
        }
        if self.provider.model.is_empty() {
            return Err(RelayError::Config("provider.model must not be empty".into()));
        }
        if self.provider.api_base.is_empty() {
            return Err(RelayError::Config(
                "provider.apiBase must not be empty".into(),
            ));
        }
        Ok(())
    }

    fn validate_gateways(&self) -> Result<(), crate::errors::RelayError> {
        use crate::errors::RelayError;

        if self.gateways.is_empty() {
            return Err(RelayError::Config(
                "at least one SMS gateway is required (gateways[] or TELERIVET_API_KEY_1)".into(),
            ));
        }
        for (i, gw) in self.gateways.iter().enumerate() {
            if gw.api_key.is_empty() {
                return Err(RelayError::Config(format!(
                    "gateways[{i}].apiKey must not be empty"
                )));
            }
            if gw.project_id.is_empty() {
                return Err(RelayError::Config(format!(
                    "gateways[{i}].projectId must not be empty"
                )));
            }
            if gw.phone_id.is_empty() {
                return Err(RelayError::Config(format!(
                    "gateways[{i}].phoneId must not be empty"
                )));
            }
        }
        if self.sms.api_base.is_empty() {
            return Err(RelayError::Config("sms.apiBase must not be empty".into()));
        }
        Ok(())
    }

    fn validate_relay(&self) -> Result<(), crate::errors::RelayError> {
        use crate::errors::RelayError;
        let r = &self.relay;

        if r.allow_from.iter().all(|s| s.trim().is_empty()) {
            return Err(RelayError::Config(
                "relay.allowFrom must list at least one phone number (or set PHONE_NUMBER)".into(),
            ));
        }
        if r.trigger_prefix.trim().is_empty() {
            return Err(RelayError::Config(
                "relay.triggerPrefix must not be empty".into(),
            ));
        }
        if r.max_context_len == 0 {
            return Err(RelayError::Config(
                "relay.maxContextLen must be > 0".into(),
            ));
        }
        if r.max_sms_chars == 0 {
            return Err(RelayError::Config("relay.maxSmsChars must be > 0".into()));
        }
        if r.max_concurrent_queries == 0 {
            return Err(RelayError::Config(
                "relay.maxConcurrentQueries must be > 0".into(),
            ));
        }
        if r.fallback_reply.is_empty() {
            return Err(RelayError::Config(
                "relay.fallbackReply must not be empty".into(),
            ));
        }
        if r.debounce_millis == 0 {
            warn!("relay.debounceMillis is 0; every reply is sent without coalescing");
        }
        if r.repeat_timeout_secs == 0 {
            warn!("relay.repeatTimeoutSecs is 0; duplicate suppression is disabled");
        }
        Ok(())
    }

    fn validate_server(&self) -> Result<(), crate::errors::RelayError> {
        use crate::errors::RelayError;

        if self.server.port == 0 {
            return Err(RelayError::Config("server.port must be > 0".into()));
        }
        if self.server.port < 1024 {
            warn!(
                "server.port {} is a privileged port (< 1024), may require elevated permissions",
                self.server.port
            );
        }
        Ok(())
    }
}
