//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! signals.rs: SIGTERM/SIGINT
//!     → shutdown.rs: Shutdown::trigger (broadcast)
//!     → each listener stops accepting, drains in-flight requests, exits
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
