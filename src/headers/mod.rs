//! Response header policy subsystem.
//!
//! # Data Flow
//! ```text
//! UpstreamResponse headers
//!     → sanitizer.rs (drop framing/isolation headers, skip recomputed ones)
//!     → cookies.rs (rewrite each Set-Cookie for the proxy domain)
//!     → client-facing HeaderMap
//! ```
//!
//! # Design Decisions
//! - The policy is applied identically for mirrored and passthrough routes
//! - content-length / content-encoding are never copied; the response
//!   assembly re-attaches values matching the bytes it actually emits

pub mod cookies;
pub mod sanitizer;

pub use cookies::rewrite_set_cookie;
pub use sanitizer::sanitize_response_headers;
