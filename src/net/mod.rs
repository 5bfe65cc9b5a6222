//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! plaintext: TcpListener → axum::serve
//! encrypted: tls.rs (RustlsConfig) → axum_server::bind_rustls
//!            → requests tagged with TlsConnection
//! ```

pub mod tls;
