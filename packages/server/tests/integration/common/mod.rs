use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    Router,
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, Uri, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use reqwest::Client;
use serde_json::Value;

use server::config::{AppConfig, CorsConfig, ServerConfig, UpstreamConfig};
use server::state::AppState;
use server::upstream::UpstreamClient;

pub mod routes {
    pub const VOTE: &str = "/api/vote";

    pub fn results(poll_id: &str) -> String {
        format!("/api/results/{poll_id}")
    }
}

/// A request as seen by the fake upstream.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    /// Query string exactly as it arrived, before any decoding.
    pub raw_query: Option<String>,
    pub query: HashMap<String, String>,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

struct FakeState {
    status: StatusCode,
    content_type: &'static str,
    body: String,
    hits: AtomicUsize,
    last: Mutex<Option<RecordedRequest>>,
}

/// Stand-in for the vote and results services. Answers every request with a
/// fixed status and body and records what it received.
pub struct FakeUpstream {
    pub addr: SocketAddr,
    state: Arc<FakeState>,
}

impl FakeUpstream {
    pub async fn json(status: u16, body: Value) -> Self {
        Self::spawn(status, "application/json", body.to_string()).await
    }

    pub async fn text(status: u16, body: &str) -> Self {
        Self::spawn(status, "text/plain", body.to_string()).await
    }

    async fn spawn(status: u16, content_type: &'static str, body: String) -> Self {
        let state = Arc::new(FakeState {
            status: StatusCode::from_u16(status).expect("valid status code"),
            content_type,
            body,
            hits: AtomicUsize::new(0),
            last: Mutex::new(None),
        });

        let app = Router::new()
            .route("/vote", post(record))
            .route("/results", get(record))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake upstream");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.state
            .last
            .lock()
            .unwrap()
            .clone()
            .expect("fake upstream received no request")
    }
}

async fn record(
    State(state): State<Arc<FakeState>>,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    *state.last.lock().unwrap() = Some(RecordedRequest {
        path: uri.path().to_string(),
        raw_query: uri.query().map(String::from),
        query,
        content_type: headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from),
        body: body.to_vec(),
    });

    (
        state.status,
        [(CONTENT_TYPE, state.content_type)],
        state.body.clone(),
    )
        .into_response()
}

/// Base URL of a port nothing is listening on.
pub fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind probe port");
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// A running test server.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

impl TestApp {
    pub async fn spawn(vote_api_url: Option<String>, results_api_url: Option<String>) -> Self {
        Self::spawn_with_cors(vote_api_url, results_api_url, CorsConfig::default()).await
    }

    /// Server with no upstreams configured and `origins` allowed for CORS.
    pub async fn with_cors_origins(origins: &[&str]) -> Self {
        let cors = CorsConfig {
            allow_origins: origins.iter().map(|o| o.to_string()).collect(),
            ..Default::default()
        };
        Self::spawn_with_cors(None, None, cors).await
    }

    async fn spawn_with_cors(
        vote_api_url: Option<String>,
        results_api_url: Option<String>,
        cors: CorsConfig,
    ) -> Self {
        let app_config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors,
            },
            upstream: UpstreamConfig {
                vote_api_url,
                results_api_url,
                timeout_secs: 5,
            },
        }
        .validate()
        .expect("test config should be valid");

        let state = AppState {
            upstream: UpstreamClient::new(app_config.upstream.timeout())
                .expect("Failed to build upstream client"),
            config: app_config,
        };

        let app = server::build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
        }
    }

    /// Server with both routes pointed at `fake`.
    pub async fn with_upstream(fake: &FakeUpstream) -> Self {
        Self::spawn(Some(fake.url()), Some(fake.url())).await
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn post_raw(&self, path: &str, body: &'static str) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    /// CORS preflight for `method` on `path` from `origin`.
    pub async fn preflight(&self, path: &str, origin: &str, method: &str) -> reqwest::Response {
        self.client
            .request(reqwest::Method::OPTIONS, self.url(path))
            .header("Origin", origin)
            .header("Access-Control-Request-Method", method)
            .header("Access-Control-Request-Headers", "content-type")
            .send()
            .await
            .expect("Failed to send OPTIONS request")
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }
}

impl TestResponse {
    pub async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let text = res.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self { status, text, body }
    }
}
