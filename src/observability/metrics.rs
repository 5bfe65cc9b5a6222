//! Metrics collection and exposition.
//!
//! # Metrics
//! - `ssl_enforcer_redirects_total` (counter): redirects issued, by target scheme
//! - `ssl_enforcer_passthrough_total` (counter): requests forwarded, by `secure`
//! - `ssl_enforcer_ignored_total` (counter): requests matched by an `ignore` rule
//! - `ssl_enforcer_bad_redirects_total` (counter): 400s from unbuildable locations
//!
//! Counters are no-ops until a recorder is installed by [`init_metrics`].

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::enforcer::Scheme;

pub fn record_redirect(scheme: Scheme) {
    counter!("ssl_enforcer_redirects_total", "scheme" => scheme.as_str()).increment(1);
}

pub fn record_passthrough(secure: bool) {
    let secure = if secure { "true" } else { "false" };
    counter!("ssl_enforcer_passthrough_total", "secure" => secure).increment(1);
}

pub fn record_ignored() {
    counter!("ssl_enforcer_ignored_total").increment(1);
}

pub fn record_bad_redirect() {
    counter!("ssl_enforcer_bad_redirects_total").increment(1);
}

/// Install the Prometheus recorder and serve `/metrics` on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Prometheus exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install Prometheus exporter"),
    }
}
