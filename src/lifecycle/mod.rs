//! Process lifecycle subsystem.
//!
//! # Design Decisions
//! - A single broadcast channel coordinates graceful shutdown: the binary
//!   triggers it on Ctrl-C, tests trigger it programmatically

pub mod shutdown;

pub use shutdown::Shutdown;
