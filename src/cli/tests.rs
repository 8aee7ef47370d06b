use super::*;
use crate::config::SmsGatewayConfig;
use clap::CommandFactory;

fn valid_config() -> Config {
    let mut config = Config::default();
    config.provider.api_key = "sk-or-secret".into();
    config.gateways = vec![
        SmsGatewayConfig {
            api_key: "tr-secret-1".into(),
            project_id: "PJ1".into(),
            phone_id: "PN1".into(),
        },
        SmsGatewayConfig {
            api_key: "tr-secret-2".into(),
            project_id: "PJ2".into(),
            phone_id: "PN2".into(),
        },
    ];
    config.relay.allow_from = vec!["+15550001".into()];
    config
}

#[test]
fn test_cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn test_parse_serve_overrides() {
    let cli = Cli::try_parse_from([
        "smsrelay", "serve", "--config", "/tmp/c.json", "--host", "127.0.0.1", "--port", "8080",
    ])
    .unwrap();
    match cli.command {
        Commands::Serve { config, host, port } => {
            assert_eq!(config, Some(PathBuf::from("/tmp/c.json")));
            assert_eq!(host.as_deref(), Some("127.0.0.1"));
            assert_eq!(port, Some(8080));
        }
        Commands::Check { .. } => panic!("expected serve"),
    }
}

#[test]
fn test_parse_check() {
    let cli = Cli::try_parse_from(["smsrelay", "check"]).unwrap();
    assert!(matches!(cli.command, Commands::Check { config: None }));
}

#[test]
fn test_parse_rejects_bad_port() {
    assert!(Cli::try_parse_from(["smsrelay", "serve", "--port", "99999"]).is_err());
}

#[test]
fn test_summary_has_no_secrets() {
    let summary = config_summary(&valid_config());
    assert!(summary.contains("SMS gateways:     2"));
    assert!(summary.contains("project=PJ2 phone=PN2"));
    assert!(!summary.contains("secret"));
}

#[tokio::test]
async fn test_build_relay_from_valid_config() {
    let (pipeline, _state) = build_relay(&valid_config()).unwrap();
    assert_eq!(pipeline.pending_replies(), 0);
}

#[test]
fn test_build_relay_requires_gateway() {
    let mut config = valid_config();
    config.gateways.clear();
    assert!(build_relay(&config).is_err());
}
