//! # Image Proxy
//!
//! A small relay in front of the third-party image host. The browser-facing
//! side accepts `GET /<content path>`; the upstream side receives only the
//! spartan auth header, never the caller's cookies or other headers.
//!
//! ```text
//! client ── GET /<path> (any headers) ──► proxy
//!                                          │ keep X-343-Authorization-Spartan
//!                                          ▼
//!                              GET <upstream>/<path>
//!                                          │
//! client ◄── status + Content-Type + body stream
//! ```
//!
//! Upstream statuses are relayed as-is so the client can tell a missing
//! image (404) from a working one. Only a network failure reaching the
//! upstream turns into `502 Bad Gateway`.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use futures::TryStreamExt;
use log::{debug, info, warn};
use tokio::net::TcpListener;

use crate::api::images::SPARTAN_AUTH_HEADER;

/// Shared state for the relay handlers.
pub struct ProxyState {
    upstream_base: String,
    client: reqwest::Client,
}

impl ProxyState {
    pub fn new(upstream_base: impl Into<String>, timeout: Duration) -> Result<Self, ProxyError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProxyError::Config(e.to_string()))?;
        Ok(Self {
            upstream_base: upstream_base.into().trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[derive(Debug)]
pub enum ProxyError {
    Config(String),
    /// Could not reach the upstream host.
    Upstream(String),
}

impl std::fmt::Display for ProxyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProxyError::Config(msg) => write!(f, "proxy config error: {msg}"),
            ProxyError::Upstream(msg) => write!(f, "upstream unreachable: {msg}"),
        }
    }
}

impl std::error::Error for ProxyError {}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = match self {
            ProxyError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::Upstream(_) => StatusCode::BAD_GATEWAY,
        };
        (status, self.to_string()).into_response()
    }
}

/// The subset of inbound headers forwarded upstream: the spartan auth header only.
pub fn forwarded_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut forwarded = HeaderMap::new();
    if let Some(value) = inbound.get(SPARTAN_AUTH_HEADER) {
        forwarded.insert(SPARTAN_AUTH_HEADER, value.clone());
    }
    forwarded
}

/// The subset of upstream headers relayed back to the client.
fn relayed_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut relayed = HeaderMap::new();
    for name in [CONTENT_TYPE, CONTENT_LENGTH] {
        if let Some(value) = upstream.get(&name) {
            relayed.insert(name, value.clone());
        }
    }
    relayed
}

pub fn router(state: Arc<ProxyState>) -> Router {
    Router::new()
        .route("/*path", get(relay))
        .with_state(state)
}

async fn relay(
    State(state): State<Arc<ProxyState>>,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Response, ProxyError> {
    let content_path = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/")
        .trim_start_matches('/');
    let url = format!("{}/{}", state.upstream_base, content_path);

    if headers.get(SPARTAN_AUTH_HEADER).is_none() {
        debug!("Relaying {} without a spartan key", content_path);
    }

    let upstream = state
        .client
        .get(&url)
        .headers(forwarded_headers(&headers))
        .send()
        .await
        .map_err(|e| {
            warn!("Upstream request for {} failed: {}", content_path, e);
            ProxyError::Upstream(e.to_string())
        })?;

    let status = upstream.status();
    debug!("Upstream {} -> {}", content_path, status);

    let relayed = relayed_headers(upstream.headers());
    let path_for_log = content_path.to_string();
    let body = Body::from_stream(upstream.bytes_stream().inspect_err(move |e| {
        warn!("Upstream body for {} broke off: {}", path_for_log, e);
    }));

    Ok((status, relayed, body).into_response())
}

/// Serves the proxy on an already-bound listener.
pub async fn serve_on(listener: TcpListener, state: ProxyState) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(
            "Image proxy listening on {} -> {}",
            addr, state.upstream_base
        );
    }
    axum::serve(listener, router(Arc::new(state))).await
}

/// Binds `0.0.0.0:<port>` and serves until the process exits.
pub async fn serve(port: u16, state: ProxyState) -> std::io::Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    serve_on(listener, state).await
}
