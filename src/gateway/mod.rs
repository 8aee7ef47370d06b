/// HTTP surface of the relay.
///
/// Receives inbound SMS webhooks from the gateway provider, hands them to the
/// conversation pipeline and answers immediately; the model reply goes out
/// later through the SMS sender.
use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::{debug, error, info, warn};

use crate::bus::InboundMessage;
use crate::relay::{ConversationPipeline, HandlingOutcome};

/// Max inbound webhook payload size: 64 KB.
const INCOMING_MAX_BODY: usize = 65_536;

/// Shared state for the HTTP handlers.
#[derive(Clone)]
pub struct GatewayState {
    pipeline: Arc<ConversationPipeline>,
    gateway_count: usize,
}

impl GatewayState {
    pub fn new(pipeline: Arc<ConversationPipeline>, gateway_count: usize) -> Self {
        Self {
            pipeline,
            gateway_count,
        }
    }
}

/// Fields the relay reads from an inbound webhook. Anything else the
/// provider sends is ignored.
#[derive(Debug, Default)]
struct IncomingSms {
    from_number: Option<String>,
    content: Option<String>,
}

fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route("/", get(liveness_handler))
        .route("/incoming", post(incoming_handler))
        .route("/incoming/", post(incoming_handler))
        .route("/api/health", get(health_handler))
        .with_state(state)
}

/// GET /: plain-text liveness probe.
async fn liveness_handler(State(state): State<GatewayState>) -> impl IntoResponse {
    format!("SMS relay ({} gateway(s)) is running!", state.gateway_count)
}

/// GET /api/health: health check endpoint.
async fn health_handler(State(state): State<GatewayState>) -> impl IntoResponse {
    let metrics = state.pipeline.provider_metrics();
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION,
        "gateways": state.gateway_count,
        "pendingReplies": state.pipeline.pending_replies(),
        "model": state.pipeline.model(),
        "provider": {
            "requests": metrics.request_count,
            "tokens": metrics.token_count,
            "errors": metrics.error_count,
        },
    }))
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.to_ascii_lowercase().contains("json"))
}

/// Decode a JSON or URL-encoded form body. `None` means the body is empty or
/// not decodable.
fn parse_incoming(headers: &HeaderMap, body: &[u8]) -> Option<IncomingSms> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    if is_json(headers) {
        let value: serde_json::Value = serde_json::from_slice(body).ok()?;
        let fields = value.as_object().filter(|obj| !obj.is_empty())?;
        let text_field = |name: &str| match fields.get(name)? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        };
        return Some(IncomingSms {
            from_number: text_field("from_number"),
            content: text_field("content"),
        });
    }

    let mut sms = IncomingSms::default();
    let mut saw_field = false;
    for (key, value) in form_urlencoded::parse(body) {
        saw_field = true;
        match key.as_ref() {
            "from_number" => sms.from_number = Some(value.into_owned()),
            "content" => sms.content = Some(value.into_owned()),
            _ => {}
        }
    }
    saw_field.then_some(sms)
}

/// POST /incoming: inbound SMS webhook.
async fn incoming_handler(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    if body.len() > INCOMING_MAX_BODY {
        warn!("incoming: payload too large ({} bytes)", body.len());
        return (StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large");
    }

    let Some(sms) = parse_incoming(&headers, &body) else {
        warn!("incoming: empty or malformed payload");
        return (StatusCode::BAD_REQUEST, "Bad Request");
    };

    let Some(sender) = sms.from_number.filter(|s| !s.trim().is_empty()) else {
        warn!("incoming: payload without from_number");
        return (
            StatusCode::FORBIDDEN,
            HandlingOutcome::Unauthorized.response_text(),
        );
    };

    let content = sms.content.unwrap_or_default();
    debug!("incoming: {} chars from {}", content.chars().count(), sender);

    let outcome = state
        .pipeline
        .handle_inbound(InboundMessage::new(sender, content));
    let status = match outcome {
        HandlingOutcome::Unauthorized => StatusCode::FORBIDDEN,
        _ => StatusCode::OK,
    };
    (status, outcome.response_text())
}

/// Bind the listener and serve until `shutdown` resolves.
pub async fn start<F>(
    host: &str,
    port: u16,
    state: GatewayState,
    shutdown: F,
) -> Result<tokio::task::JoinHandle<()>>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(state);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("SMS relay listening on {}", addr);

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
        {
            error!("HTTP server error: {}", e);
        }
    });

    Ok(handle)
}
