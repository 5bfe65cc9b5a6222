//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! enforcement middleware
//!     → logging.rs (structured events via tracing)
//!     → metrics.rs (decision counters)
//!
//! Consumers:
//!     → stdout (fmt layer)
//!     → Prometheus scrape (optional)
//! ```

pub mod logging;
pub mod metrics;
