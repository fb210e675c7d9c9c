//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::{Json, Router};
use serde_json::Value;
use tokio::net::TcpListener;

use yaya_gateway::config::GatewayConfig;
use yaya_gateway::lifecycle::{build_transactions_api, Shutdown};
use yaya_gateway::GatewayServer;

pub const API_KEY: &str = "test-key";
pub const API_SECRET: &str = "s3cr3t";

/// One request as seen by the mock wallet API.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    /// Path and query, exactly as received.
    pub target: String,
    pub headers: HeaderMap,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> &str {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
    }
}

type Responder = dyn Fn(usize, &RecordedRequest) -> (u16, Value) + Send + Sync;

#[derive(Clone)]
struct UpstreamState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    responder: Arc<Responder>,
    delay: Duration,
}

/// Handle to a running mock wallet API.
pub struct MockUpstream {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockUpstream {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

async fn record(
    State(state): State<UpstreamState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let request = RecordedRequest {
        method,
        target: uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_default(),
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    };

    let (status, data) = {
        let mut requests = state.requests.lock().unwrap();
        let result = (state.responder)(requests.len(), &request);
        requests.push(request);
        result
    };

    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }

    (StatusCode::from_u16(status).unwrap(), Json(data))
}

/// Start a programmable mock wallet API on a free local port.
///
/// `responder` gets the zero-based call index and the request.
pub async fn start_programmable_upstream<F>(responder: F) -> MockUpstream
where
    F: Fn(usize, &RecordedRequest) -> (u16, Value) + Send + Sync + 'static,
{
    start_slow_upstream(Duration::ZERO, responder).await
}

/// Like [`start_programmable_upstream`], but every response waits `delay`.
///
/// Requests are recorded on arrival.
pub async fn start_slow_upstream<F>(delay: Duration, responder: F) -> MockUpstream
where
    F: Fn(usize, &RecordedRequest) -> (u16, Value) + Send + Sync + 'static,
{
    let requests = Arc::new(Mutex::new(Vec::new()));
    let state = UpstreamState {
        requests: requests.clone(),
        responder: Arc::new(responder),
        delay,
    };
    let app = Router::new().fallback(record).with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockUpstream { addr, requests }
}

/// The signature a correctly-signing client would send for `canonical`.
pub fn expected_signature(canonical: &str) -> String {
    yaya_gateway::signing::canonical::compute_signature(API_SECRET, canonical).unwrap()
}

/// Gateway config pointing at `base_url`, with test credentials.
pub fn gateway_config(base_url: &str) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.upstream.base_url = base_url.to_string();
    config.upstream.api_key = Some(API_KEY.to_string());
    config.upstream.api_secret = Some(API_SECRET.to_string());
    config.upstream.attempt_timeout_secs = 2;
    config
}

/// Start the gateway on a free local port.
pub async fn start_gateway(config: GatewayConfig) -> (SocketAddr, Shutdown) {
    let api = Arc::new(build_transactions_api(&config).unwrap());
    let server = GatewayServer::new(config, api);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    (addr, shutdown)
}

/// Poll until the upstream has seen `expected` calls or `within` elapses.
pub async fn wait_for_calls(upstream: &MockUpstream, expected: usize, within: Duration) -> usize {
    let deadline = tokio::time::Instant::now() + within;
    while upstream.calls() < expected && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    upstream.calls()
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
