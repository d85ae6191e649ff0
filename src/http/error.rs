//! Gateway error surface.
//!
//! All per-request failures collapse to a 502 for the client: either the
//! upstream could not be reached, or it returned a body the codec could not
//! decode. Nothing is retried; failures stay local to the request.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::compression::CodecError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "request failed at the gateway");
        (StatusCode::BAD_GATEWAY, "upstream request failed").into_response()
    }
}
