//! Mock LLM vendor for integration tests
//!
//! Serves OpenAI-, Anthropic-, and Google-shaped generation endpoints on one
//! port, with scripted failures and delays, and records every request.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

/// Scripted behaviour of a mock vendor
#[derive(Debug, Clone)]
pub struct Behavior {
    /// Requests to fail before succeeding
    pub fail_first: u32,
    /// Status used for scripted failures
    pub fail_status: StatusCode,
    /// Requests to delay before answering
    pub delay_first: u32,
    pub delay: Duration,
    /// Generated text returned on success
    pub content: String,
    /// Include a usage block in successful replies
    pub include_usage: bool,
    /// Replace the vendor-shaped reply with this raw body
    pub raw_body: Option<String>,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            fail_first: 0,
            fail_status: StatusCode::SERVICE_UNAVAILABLE,
            delay_first: 0,
            delay: Duration::ZERO,
            content: "Hello from the mock".to_owned(),
            include_usage: true,
            raw_body: None,
        }
    }
}

impl Behavior {
    pub fn failing(n: u32, status: StatusCode) -> Self {
        Self {
            fail_first: n,
            fail_status: status,
            ..Self::default()
        }
    }

    pub fn slow(n: u32, delay: Duration) -> Self {
        Self {
            delay_first: n,
            delay,
            ..Self::default()
        }
    }

    pub fn replying(content: &str) -> Self {
        Self {
            content: content.to_owned(),
            ..Self::default()
        }
    }
}

/// One request as the mock saw it
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: Value,
}

struct MockState {
    behavior: Behavior,
    request_count: AtomicU32,
    requests: Mutex<Vec<RecordedRequest>>,
}

#[derive(Debug, Clone, Copy)]
enum Family {
    OpenAi,
    Anthropic,
    Google,
}

/// Mock vendor bound to a random local port
pub struct MockProvider {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

impl MockProvider {
    /// Start a mock that always succeeds
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_with(Behavior::default()).await
    }

    pub async fn start_with(behavior: Behavior) -> anyhow::Result<Self> {
        let state = Arc::new(MockState {
            behavior,
            request_count: AtomicU32::new(0),
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/v1/chat/completions", routing::post(handle_openai))
            .route("/anthropic/v1/messages", routing::post(handle_anthropic))
            .route("/google/v1beta/models/{call}", routing::post(handle_google))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL for `OpenAI`-compatible providers
    pub fn openai_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    pub fn anthropic_url(&self) -> String {
        format!("http://{}/anthropic/v1", self.addr)
    }

    pub fn google_url(&self) -> String {
        format!("http://{}/google/v1beta", self.addr)
    }

    /// Requests received so far
    pub fn request_count(&self) -> u32 {
        self.state.request_count.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.state.requests.lock().last().cloned()
    }
}

impl Drop for MockProvider {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle_openai(State(state): State<Arc<MockState>>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    respond(&state, Family::OpenAi, "/v1/chat/completions".to_owned(), &headers, body).await
}

async fn handle_anthropic(State(state): State<Arc<MockState>>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    respond(&state, Family::Anthropic, "/anthropic/v1/messages".to_owned(), &headers, body).await
}

async fn handle_google(
    State(state): State<Arc<MockState>>,
    Path(call): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    respond(&state, Family::Google, format!("/google/v1beta/models/{call}"), &headers, body).await
}

async fn respond(state: &MockState, family: Family, path: String, headers: &HeaderMap, body: Value) -> Response {
    let n = state.request_count.fetch_add(1, Ordering::SeqCst);
    let behavior = &state.behavior;

    let model = match family {
        Family::Google => path
            .rsplit('/')
            .next()
            .and_then(|call| call.split(':').next())
            .unwrap_or_default()
            .to_owned(),
        _ => body["model"].as_str().unwrap_or_default().to_owned(),
    };

    state.requests.lock().push(RecordedRequest {
        path,
        headers: headers
            .iter()
            .filter_map(|(name, value)| Some((name.as_str().to_owned(), value.to_str().ok()?.to_owned())))
            .collect(),
        body,
    });

    if n < behavior.delay_first {
        tokio::time::sleep(behavior.delay).await;
    }

    if n < behavior.fail_first {
        let error = json!({ "error": { "message": "scripted failure", "type": "mock_error" } });
        return (behavior.fail_status, Json(error)).into_response();
    }

    if let Some(raw) = &behavior.raw_body {
        return (StatusCode::OK, raw.clone()).into_response();
    }

    let reply = match family {
        Family::OpenAi => openai_reply(&model, behavior),
        Family::Anthropic => anthropic_reply(&model, behavior),
        Family::Google => google_reply(&model, behavior),
    };
    Json(reply).into_response()
}

fn openai_reply(model: &str, behavior: &Behavior) -> Value {
    let mut reply = json!({
        "id": "chatcmpl-mock",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": model,
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": behavior.content },
            "finish_reason": "stop"
        }]
    });
    if behavior.include_usage {
        reply["usage"] = json!({ "prompt_tokens": 12, "completion_tokens": 8, "total_tokens": 20 });
    }
    reply
}

fn anthropic_reply(model: &str, behavior: &Behavior) -> Value {
    let mut reply = json!({
        "id": "msg_mock",
        "type": "message",
        "role": "assistant",
        "model": model,
        "content": [{ "type": "text", "text": behavior.content }],
        "stop_reason": "end_turn"
    });
    if behavior.include_usage {
        reply["usage"] = json!({ "input_tokens": 12, "output_tokens": 8 });
    }
    reply
}

fn google_reply(model: &str, behavior: &Behavior) -> Value {
    let mut reply = json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": behavior.content }] },
            "finishReason": "STOP"
        }],
        "modelVersion": model
    });
    if behavior.include_usage {
        reply["usageMetadata"] = json!({
            "promptTokenCount": 12,
            "candidatesTokenCount": 8,
            "totalTokenCount": 20
        });
    }
    reply
}
