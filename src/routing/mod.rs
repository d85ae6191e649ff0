//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → classifier.rs (mirrored prefix? passthrough allowlist? fallback)
//!     → RouteClass, consumed by the gateway dispatcher
//!
//! Route compilation (at startup):
//!     GatewayConfig
//!     → prefix + passthrough allowlist frozen as immutable RouteClassifier
//! ```
//!
//! # Design Decisions
//! - Classification is a pure function of the path against two allowlists
//! - No regex in the hot path (prefix matching only)
//! - Exactly one RouteClass per request, checked in a fixed order

pub mod classifier;

pub use classifier::{PassthroughRouter, RouteClass, RouteClassifier};
