//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, catch-all handler, route dispatch)
//!     → upstream.rs (sanitized forward to the mirrored origin)
//!     → response.rs (header policy + rewrite pipeline or stream-through)
//!     → Send to client
//! ```

pub mod error;
pub mod response;
pub mod server;
pub mod upstream;

pub use error::GatewayError;
pub use server::HttpServer;
pub use upstream::UpstreamTarget;
