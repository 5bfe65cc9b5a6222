//! Structured logging.
//!
//! `RUST_LOG` wins over the configured level when set.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Default filter directive for a configured level.
pub fn default_filter(level: &str) -> String {
    format!("ssl_enforcer={},tower_http=info", level)
}

/// Install the global subscriber. Call once, from the binary.
pub fn init_logging(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(&config.log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
