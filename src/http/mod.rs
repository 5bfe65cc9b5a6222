//! HTTP integration subsystem.
//!
//! # Data Flow
//! ```text
//! TCP / TLS connection
//!     → server.rs (axum setup, TlsConnection marker on the TLS listener)
//!     → middleware.rs (enforce_scheme)
//!         → request.rs (RequestView: scheme, host, path, method, agent)
//!         → enforcer (ignore / redirect / reject / forward)
//!         → response.rs (redirect or 400)
//!     → inner application (upstream or built-in responder)
//!     → middleware.rs (secure cookies, HSTS on encrypted responses)
//!     → Send to client
//! ```

pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use middleware::{enforce, enforce_scheme, EnforcerState};
pub use request::{RequestView, TlsConnection, X_FORWARDED_PROTO, X_SSL_REQUEST};
pub use server::HttpServer;
