//! Transport-scheme enforcement for HTTP services.
//!
//! Redirects plaintext requests to HTTPS (and, in strict or mixed mode,
//! encrypted requests back to HTTP) according to configurable path, host,
//! method, environment and user-agent rules. On encrypted responses it marks
//! cookies `secure` and can add `Strict-Transport-Security`.
//!
//! Use [`http::enforce`] to wrap an axum `Router`, or run the bundled gateway
//! ([`http::HttpServer`]) in front of an existing application.

pub mod config;
pub mod enforcer;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;

pub use config::schema::GatewayConfig;
pub use enforcer::{Enforcer, EnforcerOptions, Outcome};
pub use http::{enforce, EnforcerState, HttpServer, RequestView};
pub use lifecycle::Shutdown;
