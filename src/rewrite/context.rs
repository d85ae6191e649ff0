//! Per-request rewrite parameters.
//!
//! # Responsibilities
//! - Capture the origin the *client* used to reach the gateway
//! - Carry the mirrored prefix and the upstream host for the rules
//!
//! # Design Decisions
//! - Built fresh for every request from `Host` / `X-Forwarded-Proto`; the
//!   client-observed host varies across deployment domains, so caching a
//!   context across requests would bake in the wrong origin
//! - Nothing here outlives a single request/response cycle

use axum::http::{header, HeaderMap};

/// Parameters for one rewriting pass.
#[derive(Debug, Clone)]
pub struct RewriteContext {
    /// Scheme + host as observed by the client (e.g., "https://example.com").
    pub proxy_origin: String,

    /// Host (with port, if any) as observed by the client.
    pub proxy_host: String,

    /// Mirrored path prefix (e.g., "/go").
    pub path_prefix: String,

    /// Host whose literal occurrences are rewritten out of response bodies.
    pub upstream_host: String,
}

impl RewriteContext {
    /// Build a context from the inbound request headers.
    ///
    /// The scheme honors `X-Forwarded-Proto` when a fronting TLS terminator
    /// sets it, falling back to plain http.
    pub fn from_request(headers: &HeaderMap, path_prefix: &str, upstream_host: &str) -> Self {
        let scheme = headers
            .get("x-forwarded-proto")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or("http");

        let proxy_host = headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("localhost")
            .to_string();

        Self {
            proxy_origin: format!("{}://{}", scheme, proxy_host),
            proxy_host,
            path_prefix: path_prefix.to_string(),
            upstream_host: upstream_host.to_string(),
        }
    }

    /// Client host without the port, as used in cookie `Domain` attributes.
    pub fn cookie_host(&self) -> &str {
        self.proxy_host
            .split(':')
            .next()
            .unwrap_or(&self.proxy_host)
    }
}
