//! Integration tests for the Axum router.
//!
//! These drive the router in-process with `oneshot` and read SSE bodies
//! frame by frame.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use toolgate_axum::bootstrap::{AxumContext, CorsConfig};
use toolgate_axum::routes::create_router;
use toolgate_core::ToolConfiguration;
use toolgate_db::InMemoryCatalog;
use toolgate_mcp::{LineBridgeFactory, SessionSettings};
use toolgate_runtime::TeardownPolicy;

const PREFIX: &str = "/mcp";

fn app() -> Router {
    let catalog = Arc::new(
        InMemoryCatalog::new().with_tool("echo", ToolConfiguration::stdio("cat", vec![])),
    );
    let settings = SessionSettings {
        poll_interval: Duration::from_millis(20),
        teardown: TeardownPolicy {
            grace_period: Duration::from_secs(1),
        },
        ..SessionSettings::default()
    };
    let ctx = AxumContext::from_catalog(
        catalog.clone(),
        catalog,
        Arc::new(LineBridgeFactory),
        settings,
        PREFIX,
    );
    create_router(ctx, &CorsConfig::AllowAll)
}

async fn get(app: &Router, uri: &str) -> axum::response::Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post_json(app: &Router, uri: &str, body: &Value) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

/// Minimal SSE reader over a streaming response body.
struct SseReader {
    body: Body,
    buffer: String,
}

impl SseReader {
    fn new(response: axum::response::Response) -> Self {
        Self {
            body: response.into_body(),
            buffer: String::new(),
        }
    }

    /// Next `(event, data)` pair, skipping keep-alive comments. `None` once
    /// the stream has ended.
    async fn next_event(&mut self) -> Option<(String, String)> {
        loop {
            if let Some(end) = self.buffer.find("\n\n") {
                let block: String = self.buffer.drain(..end + 2).collect();
                let mut event = String::from("message");
                let mut data = Vec::new();
                for line in block.lines() {
                    if let Some(value) = line.strip_prefix("event:") {
                        event = value.trim().to_string();
                    } else if let Some(value) = line.strip_prefix("data:") {
                        data.push(value.trim_start().to_string());
                    }
                }
                if data.is_empty() {
                    continue;
                }
                return Some((event, data.join("\n")));
            }

            let frame = tokio::time::timeout(Duration::from_secs(5), self.body.frame())
                .await
                .expect("timed out waiting for SSE frame")?
                .unwrap();
            if let Ok(bytes) = frame.into_data() {
                self.buffer.push_str(std::str::from_utf8(&bytes).unwrap());
            }
        }
    }
}

/// Poll until posting to `endpoint` reports the session gone.
async fn wait_for_session_removal(app: &Router, endpoint: &str) {
    for _ in 0..100 {
        let response = post_json(app, endpoint, &json!({})).await;
        if response.status() == StatusCode::NOT_FOUND {
            return;
        }
        tokio::time::sleep(Duration::from_millis(30)).await;
    }
    panic!("session behind {endpoint} was never removed");
}

// ─────────────────────────────────────────────────────────────────────────────
// Health
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn probes_always_succeed() {
    let app = app();

    for _ in 0..3 {
        for (path, word) in [("/mcp/live", "live"), ("/mcp/ready", "ready")] {
            let response = get(&app, path).await;
            assert_eq!(response.status(), StatusCode::OK);

            let body = json_body(response).await;
            assert_eq!(body["output"], "success");
            assert!(body["message"].as_str().unwrap().contains(word));
        }
    }
}

#[tokio::test]
async fn routes_live_under_the_prefix_only() {
    let app = app();
    assert_eq!(get(&app, "/live").await.status(), StatusCode::NOT_FOUND);
}

// ─────────────────────────────────────────────────────────────────────────────
// Message ingress
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn message_for_unknown_session_is_not_found() {
    let app = app();
    let uri = format!(
        "/mcp/messages/?session_id={}",
        uuid::Uuid::new_v4().simple()
    );

    let response = post_json(&app, &uri, &json!({"id": 1})).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["status"], 404);
}

#[tokio::test]
async fn message_with_bad_session_id_is_rejected() {
    let app = app();

    let response = post_json(&app, "/mcp/messages/?session_id=not-a-uuid", &json!({})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json(&app, "/mcp/messages/", &json!({})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ─────────────────────────────────────────────────────────────────────────────
// SSE sessions
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn unknown_connector_opens_then_closes_the_stream() {
    let app = app();

    let response = get(&app, "/mcp/sse/nope-u1").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/event-stream"
    );

    let mut events = SseReader::new(response);
    let (event, endpoint) = events.next_event().await.unwrap();
    assert_eq!(event, "endpoint");
    assert!(endpoint.starts_with("/mcp/messages/?session_id="));

    assert_eq!(events.next_event().await, None);
    wait_for_session_removal(&app, &endpoint).await;
}

#[cfg(unix)]
#[tokio::test]
async fn session_relays_messages_and_ends_on_disconnect() {
    let app = app();

    let mut events = SseReader::new(get(&app, "/mcp/sse/echo-u1").await);
    let (_, endpoint) = events.next_event().await.unwrap();

    let request = json!({"jsonrpc": "2.0", "id": 1, "method": "ping"});
    let response = post_json(&app, &endpoint, &request).await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let (event, data) = events.next_event().await.unwrap();
    assert_eq!(event, "message");
    assert_eq!(serde_json::from_str::<Value>(&data).unwrap(), request);

    // Client goes away: the monitor notices, the connector is torn down and
    // the session leaves the registry.
    drop(events);
    wait_for_session_removal(&app, &endpoint).await;
}

#[tokio::test]
async fn concurrent_sessions_get_distinct_endpoints() {
    let app = app();

    let mut first = SseReader::new(get(&app, "/mcp/sse/nope").await);
    let mut second = SseReader::new(get(&app, "/mcp/sse/nope").await);

    let (_, a) = first.next_event().await.unwrap();
    let (_, b) = second.next_event().await.unwrap();
    assert_ne!(a, b);
}
