//! SPA application shell.
//!
//! # Responsibilities
//! - Serve the surrounding application's static files
//! - Fall back to `index.html` for any unmatched path (client-side routing)
//! - Mark the build asset directory as immutable and long-cached
//!
//! # Design Decisions
//! - Delegates file serving to tower-http's `ServeDir`/`ServeFile`
//! - Fingerprinted assets never change, so the asset prefix gets a one-year
//!   immutable Cache-Control

use std::path::PathBuf;

use axum::body::Body;
use axum::http::{header, HeaderValue, Request};
use axum::response::Response;
use tower::ServiceExt;
use tower_http::services::{ServeDir, ServeFile};

use crate::config::StaticFilesConfig;

const IMMUTABLE_CACHE: &str = "public, max-age=31536000, immutable";

/// Static shell service, cloneable per request.
#[derive(Clone)]
pub struct StaticFiles {
    service: ServeDir<ServeFile>,
    asset_prefix: String,
}

impl StaticFiles {
    pub fn from_config(config: &StaticFilesConfig) -> Self {
        let root = PathBuf::from(&config.root);
        let index = root.join(&config.index);
        Self {
            service: ServeDir::new(root).fallback(ServeFile::new(index)),
            asset_prefix: config.asset_prefix.clone(),
        }
    }

    /// Serve a request from the shell, falling back to the index document.
    pub async fn serve(&self, request: Request<Body>) -> Response {
        let is_asset = request.uri().path().starts_with(&self.asset_prefix);

        let mut response = match self.service.clone().oneshot(request).await {
            Ok(response) => response.map(Body::new),
            Err(infallible) => match infallible {},
        };

        if is_asset && response.status().is_success() {
            response.headers_mut().insert(
                header::CACHE_CONTROL,
                HeaderValue::from_static(IMMUTABLE_CACHE),
            );
        }
        response
    }
}
