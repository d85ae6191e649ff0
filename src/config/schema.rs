//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the mirror gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream origin mirrored under the path prefix.
    pub upstream: UpstreamConfig,

    /// Paths forwarded to the upstream byte-for-byte, path unchanged.
    pub passthrough: PassthroughConfig,

    /// SPA shell served for requests that match neither route.
    pub static_files: StaticFilesConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream origin configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Upstream origin, scheme and host (e.g., "https://upstream.example.com").
    pub origin: String,

    /// Host header sent to the upstream. Defaults to the origin host.
    pub host_header: Option<String>,

    /// Path prefix under which the upstream is mirrored (e.g., "/go").
    pub path_prefix: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            origin: "http://127.0.0.1:3000".to_string(),
            host_header: None,
            path_prefix: "/go".to_string(),
        }
    }
}

/// Passthrough allowlist: requests matching these paths are forwarded to the
/// upstream with the original, unstripped path and no body rewriting.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PassthroughConfig {
    /// Exact path matches (e.g., "/favicon.ico").
    pub exact: Vec<String>,

    /// Path prefix matches (e.g., "/api/").
    pub prefixes: Vec<String>,
}

/// SPA shell configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StaticFilesConfig {
    /// Directory containing the application shell.
    pub root: String,

    /// Index document served for unmatched paths.
    pub index: String,

    /// Path prefix of immutable, long-cached build assets.
    pub asset_prefix: String,
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            root: "public".to_string(),
            index: "index.html".to_string(),
            asset_prefix: "/assets/".to_string(),
        }
    }
}

/// Timeout configuration for upstream requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
