//! Client response assembly.
//!
//! # Responsibilities
//! - Rewritable content: buffer, decode, rewrite, inject (HTML), re-encode,
//!   and emit framing headers matching the actual bytes
//! - Everything else: stream the upstream body through untouched
//!
//! # Design Decisions
//! - Full-body buffering is accepted for rewritable types (HTML/JS/CSS/JSON
//!   stay bounded in size); binary content streams without buffering
//! - Non-UTF-8 text bodies degrade to pass-through rather than failing the
//!   request
//! - Streamed responses keep the upstream's own content-length and
//!   content-encoding: the bytes are identical, so the framing stays accurate

use axum::body::Body;
use axum::http::{header, HeaderValue};
use axum::response::Response;
use bytes::Bytes;

use crate::compression::{decode_body, encode_body};
use crate::headers::sanitize_response_headers;
use crate::http::error::GatewayError;
use crate::rewrite::{inject_bootstrap, ContentClass, RewriteContext, RewriteRuleSet};

/// Buffer, transform and re-encode a rewritable upstream response.
pub async fn rewrite_response(
    upstream: reqwest::Response,
    ctx: &RewriteContext,
    rules: &RewriteRuleSet,
    class: ContentClass,
    accept_encoding: Option<&str>,
) -> Result<Response, GatewayError> {
    let status = upstream.status();
    let content_encoding = upstream
        .headers()
        .get(header::CONTENT_ENCODING)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let mut headers = sanitize_response_headers(upstream.headers(), ctx.cookie_host());

    let raw = upstream.bytes().await.map_err(GatewayError::Upstream)?;
    let decoded = decode_body(&raw, content_encoding.as_deref())?;

    let transformed = match String::from_utf8(decoded.to_vec()) {
        Ok(text) => {
            let mut rewritten = rules.apply(class, &text, ctx);
            if class == ContentClass::Html {
                rewritten = inject_bootstrap(&rewritten);
            }
            Bytes::from(rewritten)
        }
        Err(_) => decoded,
    };

    let (emitted, encoding) = encode_body(&transformed, accept_encoding);
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(emitted.len()));
    if let Some(name) = encoding {
        headers.insert(header::CONTENT_ENCODING, HeaderValue::from_static(name));
    }

    let mut response = Response::new(Body::from(emitted));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    Ok(response)
}

/// Stream a non-rewritable upstream body through byte-for-byte.
pub fn stream_response(upstream: reqwest::Response, cookie_host: &str) -> Response {
    let status = upstream.status();
    let mut headers = sanitize_response_headers(upstream.headers(), cookie_host);

    for name in [header::CONTENT_LENGTH, header::CONTENT_ENCODING] {
        if let Some(value) = upstream.headers().get(&name) {
            headers.insert(name, value.clone());
        }
    }

    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}
