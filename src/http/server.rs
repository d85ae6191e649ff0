//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create the Axum router with the catch-all gateway handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Classify each request and orchestrate forwarding, rewriting and the
//!   static shell
//!
//! # Design Decisions
//! - One immutable AppState built at startup; no shared mutable state crosses
//!   requests
//! - Requests are handled independently and concurrently; within one request
//!   processing is strictly sequential
//! - Upstream failures surface as 502 to the client, never retried

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::http::response::{rewrite_response, stream_response};
use crate::http::upstream::{self, InvalidOrigin, UpstreamTarget};
use crate::observability::metrics;
use crate::rewrite::{ContentClass, RewriteContext, RewriteRuleSet};
use crate::routing::{RouteClass, RouteClassifier};
use crate::static_files::StaticFiles;

/// Application state injected into the handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub client: reqwest::Client,
    pub target: Arc<UpstreamTarget>,
    pub classifier: Arc<RouteClassifier>,
    pub rules: Arc<RewriteRuleSet>,
    pub static_files: StaticFiles,
}

/// Startup failure while assembling the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Origin(#[from] InvalidOrigin),

    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),
}

/// HTTP server for the mirror gateway.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Assemble the server from a validated configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, ServerError> {
        let target = Arc::new(UpstreamTarget::from_config(&config.upstream)?);
        let client = upstream::build_client(&config.timeouts)?;
        let classifier = Arc::new(RouteClassifier::from_config(&config));
        let static_files = StaticFiles::from_config(&config.static_files);
        let request_timeout = Duration::from_secs(config.timeouts.request_secs);

        let state = AppState {
            config: Arc::new(config),
            client,
            target,
            classifier,
            rules: Arc::new(RewriteRuleSet::new()),
            static_files,
        };

        Ok(Self {
            router: Self::build_router(state, request_timeout),
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState, request_timeout: Duration) -> Router {
        Router::new()
            .route("/{*path}", any(gateway_handler))
            .route("/", any(gateway_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(request_timeout))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main gateway handler: classify, dispatch, record.
async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let route = state.classifier.classify(&path);
    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        route = route.label(),
        "dispatching request"
    );

    let response = match route {
        RouteClass::MirroredPrefix => serve_mirrored(&state, request, &path).await,
        RouteClass::PassthroughPath => serve_passthrough(&state, request, &path).await,
        RouteClass::StaticFallback => state.static_files.serve(request).await,
    };

    metrics::record_request(&method, response.status().as_u16(), route.label(), start);
    response
}

/// Mirrored route: strip the prefix, forward, rewrite text responses.
async fn serve_mirrored(state: &AppState, request: Request<Body>, path: &str) -> Response {
    let ctx = RewriteContext::from_request(
        request.headers(),
        &state.config.upstream.path_prefix,
        &state.target.host,
    );
    let accept_encoding = request
        .headers()
        .get(header::ACCEPT_ENCODING)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let upstream_path = state.classifier.strip_prefix(path).to_string();

    let upstream = match upstream::forward(&state.client, &state.target, request, &upstream_path)
        .await
    {
        Ok(upstream) => upstream,
        Err(e) => return e.into_response(),
    };

    let class = ContentClass::from_content_type(
        upstream
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok()),
    );

    if class.is_rewritable() {
        match rewrite_response(upstream, &ctx, &state.rules, class, accept_encoding.as_deref())
            .await
        {
            Ok(response) => response,
            Err(e) => e.into_response(),
        }
    } else {
        stream_response(upstream, ctx.cookie_host())
    }
}

/// Passthrough route: original path, streamed body, sanitized headers only.
async fn serve_passthrough(state: &AppState, request: Request<Body>, path: &str) -> Response {
    let ctx = RewriteContext::from_request(
        request.headers(),
        &state.config.upstream.path_prefix,
        &state.target.host,
    );

    match upstream::forward(&state.client, &state.target, request, path).await {
        Ok(upstream) => stream_response(upstream, ctx.cookie_host()),
        Err(e) => e.into_response(),
    }
}
