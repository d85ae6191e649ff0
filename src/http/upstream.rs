//! Upstream request forwarding.
//!
//! # Responsibilities
//! - Resolve the configured origin into a reusable target (scheme, host,
//!   virtual host header)
//! - Forward sanitized requests: upstream `Host`, no `Referer`/`Origin`
//!   leaking the proxy identity, `Accept-Encoding: identity`
//!
//! # Design Decisions
//! - Requesting identity avoids decode work on the common path; the codec
//!   still handles an upstream that ignores it
//! - Redirects are not followed: the client sees the 3xx and re-enters the
//!   gateway with the rewritten location
//! - Request bodies are streamed through, never buffered

use axum::body::Body;
use axum::http::{header, HeaderValue, Method, Request};
use thiserror::Error;
use url::Url;

use crate::config::{TimeoutConfig, UpstreamConfig};
use crate::http::error::GatewayError;

/// Request headers that must not travel to the upstream.
const STRIPPED_REQUEST_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailers",
    "upgrade",
    "transfer-encoding",
    "content-length",
];

/// Resolved upstream origin, built once at startup.
#[derive(Debug, Clone)]
pub struct UpstreamTarget {
    /// Normalized origin without a trailing slash (e.g., "https://up.example").
    pub origin: String,

    /// Host (with port, if any) of the origin. This is the host whose literal
    /// occurrences get rewritten out of response bodies.
    pub host: String,

    /// Value of the `Host` header sent upstream.
    pub virtual_host: String,
}

#[derive(Debug, Error)]
#[error("invalid upstream origin {origin:?}: {reason}")]
pub struct InvalidOrigin {
    origin: String,
    reason: String,
}

impl UpstreamTarget {
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, InvalidOrigin> {
        let url = Url::parse(&config.origin).map_err(|e| InvalidOrigin {
            origin: config.origin.clone(),
            reason: e.to_string(),
        })?;
        let host = url.host_str().ok_or_else(|| InvalidOrigin {
            origin: config.origin.clone(),
            reason: "missing host".to_string(),
        })?;
        let host = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        Ok(Self {
            origin: format!("{}://{}", url.scheme(), host),
            virtual_host: config.host_header.clone().unwrap_or_else(|| host.clone()),
            host,
        })
    }
}

/// Build the shared upstream client.
pub fn build_client(timeouts: &TimeoutConfig) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(std::time::Duration::from_secs(timeouts.connect_secs))
        .timeout(std::time::Duration::from_secs(timeouts.request_secs))
        .redirect(reqwest::redirect::Policy::none())
        .build()
}

/// Forward a request to the upstream under `upstream_path`.
///
/// The caller decides the path: stripped of the mirrored prefix, or the
/// original untouched path for passthrough routes.
pub async fn forward(
    client: &reqwest::Client,
    target: &UpstreamTarget,
    request: Request<Body>,
    upstream_path: &str,
) -> Result<reqwest::Response, GatewayError> {
    let (parts, body) = request.into_parts();

    let query = parts
        .uri
        .query()
        .map(|q| format!("?{}", q))
        .unwrap_or_default();
    let url = format!("{}{}{}", target.origin, upstream_path, query);

    let mut headers = parts.headers;
    headers.remove(header::HOST);
    headers.remove(header::REFERER);
    headers.remove(header::ORIGIN);
    headers.remove(header::ACCEPT_ENCODING);
    for name in STRIPPED_REQUEST_HEADERS {
        headers.remove(*name);
    }
    if let Ok(host) = HeaderValue::from_str(&target.virtual_host) {
        headers.insert(header::HOST, host);
    }
    headers.insert(
        header::ACCEPT_ENCODING,
        HeaderValue::from_static("identity"),
    );

    let mut builder = client.request(parts.method.clone(), url).headers(headers);
    if !matches!(parts.method, Method::GET | Method::HEAD) {
        builder = builder.body(reqwest::Body::wrap_stream(body.into_data_stream()));
    }

    builder.send().await.map_err(GatewayError::Upstream)
}
