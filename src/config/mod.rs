//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks on gateway sections)
//!     → GatewayConfig
//!     → schema.rs: EnforcerSettings → EnforcerOptions (compile rules)
//!     → Enforcer::new (validate options) → shared via Arc
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    EnforcerSettings, GatewayConfig, ListenerConfig, ObservabilityConfig, TimeoutConfig,
    TlsConfig, UpstreamConfig,
};
pub use validation::ValidationError;
