use super::*;
use std::collections::HashMap;

fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn test_scalar_overrides_applied() {
    let mut config = Config::default();
    let lookup = lookup_from(&[
        ("OPENROUTER_API_KEY", "sk-or-env"),
        ("SMSRELAY_MODEL", "openai/gpt-4o-mini"),
        ("SMSRELAY_TRIGGER_PREFIX", "Ask"),
    ]);
    apply_overrides_with(&mut config, &lookup);
    assert_eq!(config.provider.api_key, "sk-or-env");
    assert_eq!(config.provider.model, "openai/gpt-4o-mini");
    assert_eq!(config.relay.trigger_prefix, "Ask");
}

#[test]
fn test_empty_value_does_not_override() {
    let mut config = Config::default();
    config.provider.api_key = "from-file".into();
    apply_overrides_with(&mut config, &lookup_from(&[("OPENROUTER_API_KEY", "")]));
    assert_eq!(config.provider.api_key, "from-file");
}

#[test]
fn test_allow_list_parsed() {
    let mut config = Config::default();
    apply_overrides_with(
        &mut config,
        &lookup_from(&[("PHONE_NUMBER", "+15550001, +15550002,,")]),
    );
    assert_eq!(config.relay.allow_from, vec!["+15550001", "+15550002"]);
}

#[test]
fn test_port_override_and_invalid_port_ignored() {
    let mut config = Config::default();
    apply_overrides_with(&mut config, &lookup_from(&[("PORT", "8081")]));
    assert_eq!(config.server.port, 8081);

    apply_overrides_with(&mut config, &lookup_from(&[("PORT", "not-a-port")]));
    assert_eq!(config.server.port, 8081);
}

#[test]
fn test_indexed_gateways_read_in_order() {
    let mut config = Config::default();
    let lookup = lookup_from(&[
        ("TELERIVET_API_KEY_1", "k1"),
        ("TELERIVET_PROJECT_ID_1", "P1"),
        ("TELERIVET_PHONE_ID_1", "N1"),
        ("TELERIVET_API_KEY_2", "k2"),
        ("TELERIVET_PROJECT_ID_2", "P2"),
        ("TELERIVET_PHONE_ID_2", "N2"),
        // Gap at 3 stops the scan
        ("TELERIVET_API_KEY_4", "k4"),
    ]);
    apply_overrides_with(&mut config, &lookup);
    assert_eq!(config.gateways.len(), 2);
    assert_eq!(config.gateways[0].project_id, "P1");
    assert_eq!(config.gateways[1].phone_id, "N2");
}

#[test]
fn test_no_env_gateways_keeps_file_gateways() {
    let mut config = Config::default();
    config.gateways.push(SmsGatewayConfig {
        api_key: "file".into(),
        project_id: "P".into(),
        phone_id: "N".into(),
    });
    apply_overrides_with(&mut config, &lookup_from(&[]));
    assert_eq!(config.gateways.len(), 1);
    assert_eq!(config.gateways[0].api_key, "file");
}

#[test]
fn test_scalar_env_var_names_listed() {
    assert!(SCALAR_ENV_VARS.contains(&"OPENROUTER_API_KEY"));
    assert!(SCALAR_ENV_VARS.contains(&"TELERIVET_API_BASE"));
}

#[test]
fn test_overrides_in_effect_lists_names_only() {
    let lookup = lookup_from(&[
        ("OPENROUTER_API_KEY", "sk-or-secret"),
        ("PORT", "8080"),
        ("SMSRELAY_MODEL", ""),
        ("TELERIVET_API_KEY_1", "k1"),
        ("TELERIVET_API_KEY_2", "k2"),
    ]);
    let names = overrides_in_effect(&lookup);
    assert_eq!(
        names,
        vec!["OPENROUTER_API_KEY", "PORT", "TELERIVET_*_1..2"]
    );
    assert!(names.iter().all(|n| !n.contains("secret")));
}
