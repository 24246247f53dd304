//! Common test utilities for E2E tests
//!
//! Each `TestServer` runs the app against its own stub indexing and
//! generation APIs, bound to ephemeral ports.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU16, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use eli5cast::{AppState, config, service::SessionView};
use serde_json::{Value, json};
use tokio::net::TcpListener;

pub const NEYNAR_KEY: &str = "test-neynar-key";
pub const OPENAI_KEY: &str = "test-openai-key";

/// What the stub indexing API answers for a successful lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastReply {
    /// `{"cast": <document>}` for known URLs, 404 otherwise
    Document,
    /// 200 with `{"cast": null}`
    NullCast,
    /// 200 with a body that is not JSON
    Garbage,
}

/// Stub upstream APIs with call counters
#[derive(Clone)]
pub struct Upstream {
    /// Cast documents keyed by the URL the app must ask for
    casts: Arc<Mutex<HashMap<String, Value>>>,
    pub neynar_calls: Arc<AtomicUsize>,
    pub openai_calls: Arc<AtomicUsize>,
    openai_bodies: Arc<Mutex<Vec<Value>>>,
    openai_status: Arc<AtomicU16>,
    cast_reply: Arc<Mutex<CastReply>>,
    /// Answer chat requests with a blank completion
    blank_generation: Arc<AtomicBool>,
}

impl Default for Upstream {
    fn default() -> Self {
        Self {
            casts: Arc::default(),
            neynar_calls: Arc::default(),
            openai_calls: Arc::default(),
            openai_bodies: Arc::default(),
            openai_status: Arc::new(AtomicU16::new(200)),
            cast_reply: Arc::new(Mutex::new(CastReply::Document)),
            blank_generation: Arc::default(),
        }
    }
}

impl Upstream {
    /// Serve `cast` when the app looks up `url`
    pub fn add_cast(&self, url: &str, cast: Value) {
        self.casts.lock().unwrap().insert(url.to_string(), cast);
    }

    /// Make the generation API answer with `status`
    pub fn fail_generation(&self, status: u16) {
        self.openai_status.store(status, Ordering::SeqCst);
    }

    /// Change what successful cast lookups return
    pub fn reply_with(&self, reply: CastReply) {
        *self.cast_reply.lock().unwrap() = reply;
    }

    /// Make the generation API answer 200 with only whitespace
    pub fn blank_generation(&self) {
        self.blank_generation.store(true, Ordering::SeqCst);
    }

    pub fn neynar_calls(&self) -> usize {
        self.neynar_calls.load(Ordering::SeqCst)
    }

    pub fn openai_calls(&self) -> usize {
        self.openai_calls.load(Ordering::SeqCst)
    }

    /// Request bodies received by the generation API, oldest first
    pub fn openai_bodies(&self) -> Vec<Value> {
        self.openai_bodies.lock().unwrap().clone()
    }

    fn router(&self) -> Router {
        Router::new()
            .route("/v2/farcaster/cast", get(neynar_cast))
            .route("/v1/chat/completions", post(openai_completion))
            .with_state(self.clone())
    }
}

async fn neynar_cast(
    State(upstream): State<Upstream>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    upstream.neynar_calls.fetch_add(1, Ordering::SeqCst);

    if headers.get("x-api-key").and_then(|v| v.to_str().ok()) != Some(NEYNAR_KEY) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if params.get("type").map(String::as_str) != Some("url") {
        return StatusCode::BAD_REQUEST.into_response();
    }

    match *upstream.cast_reply.lock().unwrap() {
        CastReply::Document => {}
        CastReply::NullCast => return Json(json!({ "cast": null })).into_response(),
        CastReply::Garbage => return (StatusCode::OK, "<html>oops</html>").into_response(),
    }

    let cast = params
        .get("identifier")
        .and_then(|url| upstream.casts.lock().unwrap().get(url).cloned());
    match cast {
        Some(cast) => Json(json!({ "cast": cast })).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"message": "Cast not found"}))).into_response(),
    }
}

async fn openai_completion(
    State(upstream): State<Upstream>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let call = upstream.openai_calls.fetch_add(1, Ordering::SeqCst) + 1;
    upstream.openai_bodies.lock().unwrap().push(body);

    let expected = format!("Bearer {OPENAI_KEY}");
    if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some(expected.as_str()) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let status = upstream.openai_status.load(Ordering::SeqCst);
    if status != 200 {
        return StatusCode::from_u16(status)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            .into_response();
    }

    let content = if upstream.blank_generation.load(Ordering::SeqCst) {
        "   ".to_string()
    } else {
        format!("  Explanation number {call}.  ")
    };

    Json(json!({
        "choices": [{
            "message": {"role": "assistant", "content": content}
        }]
    }))
    .into_response()
}

async fn spawn(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

/// Test configuration pointing at the stub upstreams
pub fn test_config(upstream_addr: &str, context_path: Option<PathBuf>) -> config::AppConfig {
    config::AppConfig {
        server: config::ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0, // Let OS assign port
        },
        neynar: config::NeynarConfig {
            api_key: Some(NEYNAR_KEY.to_string()),
            base_url: upstream_addr.to_string(),
        },
        openai: config::OpenAiConfig {
            api_key: Some(OPENAI_KEY.to_string()),
            base_url: format!("{upstream_addr}/v1"),
        },
        launch: config::LaunchConfig { context_path },
        http: config::HttpConfig { timeout_seconds: 5 },
        logging: config::LoggingConfig {
            level: "info".to_string(),
            format: "pretty".to_string(),
        },
    }
}

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub upstream: Upstream,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Start on the paste screen (no launch context)
    pub async fn new() -> Self {
        Self::with_upstream(Upstream::default(), None).await
    }

    /// Create a test server whose launch context is read from `context_path`
    pub async fn with_upstream(upstream: Upstream, context_path: Option<PathBuf>) -> Self {
        eli5cast::metrics::init_metrics();

        let upstream_addr = spawn(upstream.router()).await;
        let config = test_config(&upstream_addr, context_path);

        // Initialize app state and decide the first screen
        let state = AppState::new(config).unwrap();
        state.session.launch(state.launch_provider()).await;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        let addr = spawn(eli5cast::build_router(state.clone())).await;

        Self {
            addr,
            state,
            upstream,
            client,
        }
    }

    /// Get base URL for API requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    pub async fn session(&self) -> Value {
        self.get_json("/api/session").await
    }

    pub async fn get_json(&self, path: &str) -> Value {
        let response = self.client.get(self.url(path)).send().await.unwrap();
        assert_eq!(response.status(), 200);
        response.json().await.unwrap()
    }

    /// POST a session action and return the resulting snapshot
    pub async fn action(&self, path: &str, body: Option<Value>) -> Value {
        let request = self.client.post(self.url(path));
        let request = match body {
            Some(body) => request.json(&body),
            None => request,
        };
        let response = request.send().await.unwrap();
        assert_eq!(response.status(), 200);
        response.json().await.unwrap()
    }

    pub async fn submit(&self, url: &str) -> Value {
        self.action("/api/session/submit", Some(json!({ "url": url })))
            .await
    }

    /// Snapshot straight from the controller, bypassing HTTP
    pub async fn view(&self) -> SessionView {
        self.state.session.view().await
    }
}

/// A cast document as the indexing API returns it
pub fn api_cast(hash: &str, text: &str, embeds: Value, fid: u64, username: &str) -> Value {
    json!({
        "hash": hash,
        "text": text,
        "embeds": embeds,
        "author": {
            "fid": fid,
            "username": username,
            "display_name": username.to_uppercase(),
            "pfp_url": format!("https://i.imgur.com/{username}.png")
        }
    })
}
