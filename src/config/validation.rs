//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, ports and timeouts of the gateway
//! - Validate enforcer options (redirect code, redirect target, mode conflicts)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: config → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use std::str::FromStr;

use axum::http::uri::Authority;

use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;
use crate::enforcer::EnforcerOptions;

/// Status codes accepted for `redirect_code`.
pub const REDIRECT_CODES: [u16; 5] = [301, 302, 303, 307, 308];

/// A single semantic problem with the configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{key}: invalid pattern: {source}")]
    InvalidPattern {
        key: String,
        #[source]
        source: regex::Error,
    },
    #[error("redirect_to '{value}' is not a valid host or URL: {reason}")]
    InvalidRedirectTarget { value: String, reason: String },
    #[error("redirect_code {0} is not one of 301, 302, 303, 307, 308")]
    UnsupportedRedirectCode(u16),
    #[error("strict and mixed cannot both be enabled")]
    ConflictingModes,
    #[error("{0} must be a non-zero port")]
    InvalidPort(&'static str),
    #[error("{name} '{value}' is not a valid socket address")]
    InvalidAddress { name: &'static str, value: String },
    #[error("upstream.address '{0}' is not a valid host[:port]")]
    InvalidUpstream(String),
    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),
}

/// Validate the gateway sections (listeners, upstream, observability, timeouts).
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if let Some(tls) = &config.tls {
        check_address(&mut errors, "tls.bind_address", &tls.bind_address);
    }
    if let Some(upstream) = &config.upstream {
        if let Err(e) = upstream_authority(&upstream.address) {
            errors.push(e);
        }
    }
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("request_secs"));
    }
    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("connect_secs"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, name: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            name,
            value: value.to_string(),
        });
    }
}

/// Parse the upstream address as the authority requests are forwarded to.
pub fn upstream_authority(value: &str) -> Result<Authority, ValidationError> {
    match Authority::from_str(value) {
        Ok(authority) if !authority.host().is_empty() => Ok(authority),
        _ => Err(ValidationError::InvalidUpstream(value.to_string())),
    }
}

/// Validate enforcer options, returning the canonical redirect host if any.
pub fn validate_options(options: &EnforcerOptions) -> Result<Option<String>, Vec<ValidationError>> {
    let mut errors = Vec::new();

    if !REDIRECT_CODES.contains(&options.redirect_code) {
        errors.push(ValidationError::UnsupportedRedirectCode(options.redirect_code));
    }
    if options.strict && options.mixed {
        errors.push(ValidationError::ConflictingModes);
    }
    if options.http_port == Some(0) {
        errors.push(ValidationError::InvalidPort("http_port"));
    }
    if options.https_port == Some(0) {
        errors.push(ValidationError::InvalidPort("https_port"));
    }

    let host = match options.redirect_to.as_deref().map(redirect_host) {
        Some(Ok(host)) => Some(host),
        Some(Err(e)) => {
            errors.push(e);
            None
        }
        None => None,
    };

    if errors.is_empty() {
        Ok(host)
    } else {
        Err(errors)
    }
}

/// Extract the host of a `redirect_to` value.
///
/// Accepts a full URL (`https://www.example.org`) or a bare host
/// (`www.example.org`); only the host component is used.
pub fn redirect_host(value: &str) -> Result<String, ValidationError> {
    let candidate = if value.contains("://") {
        value.to_string()
    } else {
        format!("https://{}", value)
    };
    let invalid = |reason: String| ValidationError::InvalidRedirectTarget {
        value: value.to_string(),
        reason,
    };

    let url = Url::parse(&candidate).map_err(|e| invalid(e.to_string()))?;
    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(host.to_string()),
        _ => Err(invalid("no host component".to_string())),
    }
}
