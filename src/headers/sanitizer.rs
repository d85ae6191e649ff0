//! Response header filtering.
//!
//! # Responsibilities
//! - Copy upstream response headers to the client response
//! - Drop framing/isolation headers that would block rendering the mirrored
//!   content inside the proxy's own page context
//! - Skip framing headers that are recomputed from the emitted body
//! - Route every Set-Cookie value through the cookie rewrite
//!
//! # Design Decisions
//! - Exact-name and prefix drop lists are fixed at compile time; they encode
//!   policy, not configuration
//! - Set-Cookie is the only multi-valued header treated specially

use axum::http::{header, HeaderMap, HeaderValue};
use hyper::header::SET_COOKIE;

use crate::headers::cookies::rewrite_set_cookie;

/// Recomputed by the response assembly, never copied from the upstream.
const RECOMPUTED: &[&str] = &[
    "content-length",
    "content-encoding",
    "transfer-encoding",
    "connection",
];

/// Dropped outright: these would prevent the mirrored content from being
/// rendered or patched inside the proxy's origin.
const DROPPED: &[&str] = &[
    "x-frame-options",
    "x-content-type-options",
    "x-xss-protection",
    "strict-transport-security",
    "permissions-policy",
];

/// Dropped by name prefix (covers report-only CSP variants and the whole
/// cross-origin isolation family).
const DROPPED_PREFIXES: &[&str] = &["content-security-policy", "cross-origin-"];

fn is_dropped(name: &str) -> bool {
    RECOMPUTED.contains(&name)
        || DROPPED.contains(&name)
        || DROPPED_PREFIXES.iter().any(|p| name.starts_with(p))
}

/// Build the client-facing header map from the upstream response headers.
///
/// `cookie_host` is the client-observed host (without port) substituted into
/// cookie `Domain` attributes.
pub fn sanitize_response_headers(upstream: &HeaderMap, cookie_host: &str) -> HeaderMap {
    let mut out = HeaderMap::with_capacity(upstream.len());

    for (name, value) in upstream.iter() {
        let lower = name.as_str(); // HeaderName is already lowercase
        if lower == SET_COOKIE.as_str() || is_dropped(lower) {
            continue;
        }
        out.append(name.clone(), value.clone());
    }

    for value in upstream.get_all(SET_COOKIE).iter() {
        let Ok(cookie) = value.to_str() else {
            continue;
        };
        let rewritten = rewrite_set_cookie(cookie, cookie_host);
        if let Ok(v) = HeaderValue::from_str(&rewritten) {
            out.append(header::SET_COOKIE, v);
        }
    }

    out
}
