use super::schema::{Config, SmsGatewayConfig};
use tracing::debug;

macro_rules! define_env_overrides {
    ($( $env:literal => $($path:ident).+ );* $(;)?) => {
        /// Env var names that map one-to-one onto a string config field.
        pub const SCALAR_ENV_VARS: &[&str] = &[$($env),*];

        fn apply_scalar_overrides(config: &mut Config, lookup: &dyn Fn(&str) -> Option<String>) {
            $(
                if let Some(val) = lookup($env) {
                    if !val.is_empty() {
                        debug!("config override from {}", $env);
                        config.$($path).+ = val;
                    }
                }
            )*
        }
    };
}

define_env_overrides! {
    "OPENROUTER_API_KEY"      => provider.api_key;
    "SMSRELAY_MODEL"          => provider.model;
    "SMSRELAY_API_BASE"       => provider.api_base;
    "TELERIVET_API_BASE"      => sms.api_base;
    "SMSRELAY_TRIGGER_PREFIX" => relay.trigger_prefix;
}

/// Comma-separated list of allowed sender phone numbers.
pub const ALLOW_LIST_ENV: &str = "PHONE_NUMBER";
/// Listening port.
pub const PORT_ENV: &str = "PORT";

/// Apply overrides using an arbitrary key lookup, so callers (and tests)
/// don't have to mutate the process environment.
pub fn apply_overrides_with(config: &mut Config, lookup: &dyn Fn(&str) -> Option<String>) {
    apply_scalar_overrides(config, lookup);

    if let Some(list) = lookup(ALLOW_LIST_ENV) {
        let numbers = parse_allow_list(&list);
        if !numbers.is_empty() {
            config.relay.allow_from = numbers;
        }
    }

    if let Some(port) = lookup(PORT_ENV) {
        match port.trim().parse::<u16>() {
            Ok(p) => config.server.port = p,
            Err(_) => tracing::warn!("ignoring {}={:?}: not a valid port", PORT_ENV, port),
        }
    }

    let gateways = gateways_from_env(lookup);
    if !gateways.is_empty() {
        debug!("{} SMS gateway(s) configured from environment", gateways.len());
        config.gateways = gateways;
    }
}

/// Names of recognized environment variables that are currently set and
/// non-empty. Values are never returned.
pub fn overrides_in_effect(lookup: &dyn Fn(&str) -> Option<String>) -> Vec<String> {
    let mut names: Vec<String> = SCALAR_ENV_VARS
        .iter()
        .chain([ALLOW_LIST_ENV, PORT_ENV].iter())
        .filter(|name| lookup(name).is_some_and(|v| !v.is_empty()))
        .map(|name| (*name).to_string())
        .collect();
    let gateway_count = gateways_from_env(lookup).len();
    if gateway_count > 0 {
        names.push(format!("TELERIVET_*_1..{gateway_count}"));
    }
    names
}

/// Split a comma-separated allow-list, dropping blanks.
pub fn parse_allow_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read `TELERIVET_{API_KEY,PROJECT_ID,PHONE_ID}_<n>` for n = 1, 2, …,
/// stopping at the first index without an API key.
fn gateways_from_env(lookup: &dyn Fn(&str) -> Option<String>) -> Vec<SmsGatewayConfig> {
    let mut gateways = Vec::new();
    for n in 1.. {
        let Some(api_key) = lookup(&format!("TELERIVET_API_KEY_{n}")).filter(|v| !v.is_empty())
        else {
            break;
        };
        gateways.push(SmsGatewayConfig {
            api_key,
            project_id: lookup(&format!("TELERIVET_PROJECT_ID_{n}")).unwrap_or_default(),
            phone_id: lookup(&format!("TELERIVET_PHONE_ID_{n}")).unwrap_or_default(),
        });
    }
    gateways
}

#[cfg(test)]
mod tests;
