//! Route classification.
//!
//! # Responsibilities
//! - Decide, per request path, between the mirrored prefix, the passthrough
//!   allowlist and the static application shell
//! - Strip the mirrored prefix from paths forwarded upstream
//!
//! # Design Decisions
//! - `/go` matches `/go` and `/go/...` but never `/gopher`
//! - Passthrough paths are forwarded with the original, unmodified path
//! - Immutable after construction, shared via Arc

use crate::config::{GatewayConfig, PassthroughConfig};

/// How a request is dispatched. Derived purely from the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Under the mirrored prefix: strip it and rewrite the response.
    MirroredPrefix,
    /// Allowlisted upstream path: forward unchanged, no rewriting.
    PassthroughPath,
    /// Everything else: the SPA shell collaborator.
    StaticFallback,
}

impl RouteClass {
    /// Stable label for logs and metrics.
    pub fn label(self) -> &'static str {
        match self {
            RouteClass::MirroredPrefix => "mirror",
            RouteClass::PassthroughPath => "passthrough",
            RouteClass::StaticFallback => "static",
        }
    }
}

/// Exact-or-prefix allowlist of upstream paths that bypass the mirrored
/// prefix (the mirrored page's own client code calls them host-relative).
#[derive(Debug, Clone)]
pub struct PassthroughRouter {
    exact: Vec<String>,
    prefixes: Vec<String>,
}

impl PassthroughRouter {
    pub fn from_config(config: &PassthroughConfig) -> Self {
        Self {
            exact: config.exact.clone(),
            prefixes: config.prefixes.clone(),
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        self.exact.iter().any(|p| p == path)
            || self.prefixes.iter().any(|p| path.starts_with(p.as_str()))
    }
}

/// Immutable route table, built once at startup.
#[derive(Debug, Clone)]
pub struct RouteClassifier {
    prefix: String,
    prefix_with_slash: String,
    passthrough: PassthroughRouter,
}

impl RouteClassifier {
    pub fn from_config(config: &GatewayConfig) -> Self {
        let prefix = config.upstream.path_prefix.clone();
        Self {
            prefix_with_slash: format!("{}/", prefix),
            prefix,
            passthrough: PassthroughRouter::from_config(&config.passthrough),
        }
    }

    /// Select exactly one route class for a request path.
    pub fn classify(&self, path: &str) -> RouteClass {
        if path == self.prefix || path.starts_with(&self.prefix_with_slash) {
            RouteClass::MirroredPrefix
        } else if self.passthrough.matches(path) {
            RouteClass::PassthroughPath
        } else {
            RouteClass::StaticFallback
        }
    }

    /// Strip the mirrored prefix from a classified path.
    pub fn strip_prefix<'a>(&self, path: &'a str) -> &'a str {
        let stripped = path.strip_prefix(&self.prefix).unwrap_or(path);
        if stripped.is_empty() {
            "/"
        } else {
            stripped
        }
    }
}
