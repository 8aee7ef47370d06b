//! Full relay against mocked OpenRouter and Telerivet endpoints.

mod common;

use common::ALLOWED;
use serde_json::json;
use smsrelay::bus::InboundMessage;
use smsrelay::channels::{SmsSender, TelerivetSender};
use smsrelay::config::{ProviderConfig, RelayConfig, SmsGatewayConfig};
use smsrelay::providers::base::LLMProvider;
use smsrelay::providers::openai::OpenAIProvider;
use smsrelay::relay::{ConversationPipeline, HandlingOutcome};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{basic_auth, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn gateways() -> Vec<SmsGatewayConfig> {
    (1..=2)
        .map(|n| SmsGatewayConfig {
            api_key: format!("tr-key-{}", n),
            project_id: format!("PJ{}", n),
            phone_id: format!("PN{}", n),
        })
        .collect()
}

fn pipeline_for(model: &MockServer, sms: &MockServer) -> Arc<ConversationPipeline> {
    let provider: Arc<dyn LLMProvider> = Arc::new(OpenAIProvider::from_config(&ProviderConfig {
        api_key: "sk-or-test".into(),
        model: "deepseek/deepseek-r1:free".into(),
        api_base: format!("{}/api/v1/chat/completions", model.uri()),
    }));
    let sender: Arc<dyn SmsSender> = Arc::new(TelerivetSender::new(gateways(), sms.uri()).unwrap());
    let config = RelayConfig {
        allow_from: vec![ALLOWED.to_string()],
        debounce_millis: 200,
        ..RelayConfig::default()
    };
    Arc::new(ConversationPipeline::new(&config, provider, sender))
}

async fn wait_for_requests(server: &MockServer, count: usize) -> Vec<Request> {
    for _ in 0..100 {
        let received = server.received_requests().await.unwrap_or_default();
        if received.len() >= count {
            return received;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    server.received_requests().await.unwrap_or_default()
}

#[tokio::test]
async fn test_reply_flows_from_model_to_sms_gateway() {
    let model = MockServer::start().await;
    let sms = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .and(header("Authorization", "Bearer sk-or-test"))
        .and(body_partial_json(json!({
            "model": "deepseek/deepseek-r1:free",
            "stream": false,
            "messages": [{"role": "user", "content": "what is rust?"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "A systems language."}}]
        })))
        .expect(1)
        .mount(&model)
        .await;

    Mock::given(method("POST"))
        .and(path("/projects/PJ1/messages/send"))
        .and(basic_auth("tr-key-1", ""))
        .and(body_partial_json(json!({
            "to_number": ALLOWED,
            "content": "A systems language.",
            "phone_id": "PN1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "SM1"})))
        .expect(1)
        .mount(&sms)
        .await;

    let pipeline = pipeline_for(&model, &sms);
    let outcome = pipeline.handle_inbound(InboundMessage::new(ALLOWED, "Chat what is rust?"));
    assert_eq!(outcome, HandlingOutcome::Accepted);

    let delivered = wait_for_requests(&sms, 1).await;
    assert_eq!(delivered.len(), 1);
    assert_eq!(pipeline.context().len(ALLOWED), 2);
}

#[tokio::test]
async fn test_consecutive_replies_rotate_gateways() {
    let model = MockServer::start().await;
    let sms = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "ok"}}]
        })))
        .mount(&model)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&sms)
        .await;

    let pipeline = pipeline_for(&model, &sms);
    for i in 0..3 {
        pipeline.handle_inbound(InboundMessage::new(ALLOWED, format!("Chat question {}", i)));
        // let each reply clear the quiet period before the next one
        wait_for_requests(&sms, i + 1).await;
    }

    let paths: Vec<_> = sms
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| r.url.path().to_string())
        .collect();
    assert_eq!(
        paths,
        vec![
            "/projects/PJ1/messages/send",
            "/projects/PJ2/messages/send",
            "/projects/PJ1/messages/send",
        ]
    );
}

#[tokio::test]
async fn test_model_outage_sends_fallback() {
    let model = MockServer::start().await;
    let sms = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&model)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "content": RelayConfig::default().fallback_reply
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&sms)
        .await;

    let pipeline = pipeline_for(&model, &sms);
    pipeline.handle_inbound(InboundMessage::new(ALLOWED, "Chat hello"));

    assert_eq!(wait_for_requests(&sms, 1).await.len(), 1);
    assert_eq!(pipeline.context().len(ALLOWED), 1);
}
