//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the upstream origin parses as an http(s) URL
//! - Check the mirrored prefix and passthrough entries are well-formed paths
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic validation failure.
#[derive(Debug)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn error(field: &str, message: impl Into<String>) -> ValidationError {
    ValidationError {
        field: field.to_string(),
        message: message.into(),
    }
}

/// Validate a parsed configuration, collecting every violation.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(error(
            "listener.bind_address",
            format!("not a socket address: {}", config.listener.bind_address),
        ));
    }

    match Url::parse(&config.upstream.origin) {
        Ok(url) => {
            if url.scheme() != "http" && url.scheme() != "https" {
                errors.push(error(
                    "upstream.origin",
                    format!("scheme must be http or https, got {}", url.scheme()),
                ));
            }
            if url.host_str().is_none() {
                errors.push(error("upstream.origin", "missing host"));
            }
        }
        Err(e) => errors.push(error("upstream.origin", format!("not a URL: {}", e))),
    }

    let prefix = &config.upstream.path_prefix;
    if !prefix.starts_with('/') {
        errors.push(error("upstream.path_prefix", "must start with '/'"));
    }
    if prefix.len() < 2 || prefix.ends_with('/') {
        errors.push(error(
            "upstream.path_prefix",
            "must name a path segment without a trailing '/'",
        ));
    }

    if let Some(host) = &config.upstream.host_header {
        if host.is_empty() {
            errors.push(error("upstream.host_header", "must not be empty"));
        }
    }

    for path in config
        .passthrough
        .exact
        .iter()
        .chain(config.passthrough.prefixes.iter())
    {
        if !path.starts_with('/') {
            errors.push(error(
                "passthrough",
                format!("entry must start with '/': {}", path),
            ));
        }
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(error("timeouts.connect_secs", "must be greater than zero"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(error("timeouts.request_secs", "must be greater than zero"));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(error(
            "observability.metrics_address",
            format!(
                "not a socket address: {}",
                config.observability.metrics_address
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
