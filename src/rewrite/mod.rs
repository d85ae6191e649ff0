//! Content rewriting subsystem.
//!
//! # Data Flow
//! ```text
//! UpstreamResponse (decoded text + content-type)
//!     → context.rs (per-request RewriteContext from Host / X-Forwarded-Proto)
//!     → rules.rs (ordered pure rules per content-type bucket)
//!     → bootstrap.rs (HTML only: inline script after <head>)
//!     → rewritten text, re-encoded by the compression codec
//! ```
//!
//! # Design Decisions
//! - Every rule is a pure `(text, &RewriteContext) → String` function; rules
//!   never fail, unmatched input passes through unchanged
//! - Rule order is significant: later rules are scoped to avoid re-matching
//!   the output of earlier rules
//! - Every prefix-inserting rule skips values already carrying the prefix,
//!   so one pass is idempotent
//! - Literal substring matching accepts rare false positives (a quoted
//!   "/assets/" that is not a path is still rewritten)

pub mod bootstrap;
pub mod context;
pub mod rules;

pub use bootstrap::inject_bootstrap;
pub use context::RewriteContext;
pub use rules::{ContentClass, RewriteRuleSet};
