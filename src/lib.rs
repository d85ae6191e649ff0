//! Content-rewriting mirror gateway.
//!
//! Mirrors a remote origin under a path prefix of this server's own origin,
//! rewriting every URL reference embedded in text responses so the mirrored
//! content resolves first-party, while streaming binary payloads untouched.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────────┐
//!                 │                   MIRROR GATEWAY                      │
//!                 │                                                       │
//!  Client ───────►│  http/server ──► routing (MirroredPrefix /            │
//!                 │                   PassthroughPath / StaticFallback)   │
//!                 │        │                                              │
//!                 │        ├─ Mirrored ──► http/upstream ──► upstream     │
//!                 │        │     ◄── compression decode                   │
//!                 │        │     ◄── rewrite rules + bootstrap inject     │
//!                 │        │     ◄── headers policy + cookie rewrite      │
//!                 │        │     ◄── compression encode                   │
//!                 │        │                                              │
//!                 │        ├─ Passthrough ──► http/upstream (path as-is,  │
//!                 │        │                  stream through, headers     │
//!                 │        │                  still sanitized)            │
//!                 │        │                                              │
//!                 │        └─ Static ──► static_files (SPA shell)         │
//!                 │                                                       │
//!                 │  config · observability · lifecycle                   │
//!                 └──────────────────────────────────────────────────────┘
//! ```

// Core subsystems
pub mod config;
pub mod http;
pub mod routing;

// Content transformation
pub mod compression;
pub mod headers;
pub mod rewrite;
pub mod static_files;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
