//! TLS configuration and certificate loading.

use std::io;
use std::path::Path;

use axum_server::tls_rustls::RustlsConfig;

use crate::config::TlsConfig;

/// Load the rustls server config for the encrypted listener.
pub async fn load_tls_config(config: &TlsConfig) -> Result<RustlsConfig, io::Error> {
    let cert = Path::new(&config.cert_path);
    let key = Path::new(&config.key_path);
    ensure_exists(cert, "Certificate")?;
    ensure_exists(key, "Private key")?;

    tracing::debug!(cert = %cert.display(), key = %key.display(), "Loading TLS material");
    RustlsConfig::from_pem_file(cert, key).await
}

fn ensure_exists(path: &Path, what: &str) -> Result<(), io::Error> {
    if path.exists() {
        Ok(())
    } else {
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} file not found: {}", what, path.display()),
        ))
    }
}
