//! Request inspection.
//!
//! # Responsibilities
//! - Snapshot the attributes the enforcer decides on (scheme, host, path, method)
//! - Derive the effective scheme from trusted proxy headers or the TLS listener
//! - Carry the deployment environment handed in by the hosting layer
//!
//! # Design Decisions
//! - `X-Forwarded-Proto` and `X-SSL-Request` are trusted as-is; the front proxy
//!   must strip them from untrusted clients
//! - Absolute-form authority wins over the `Host` header

use axum::http::{header, uri::Authority, Request};

use crate::enforcer::Scheme;

pub const X_FORWARDED_PROTO: &str = "x-forwarded-proto";
pub const X_SSL_REQUEST: &str = "x-ssl-request";

/// Marker extension set on requests accepted by the TLS listener.
#[derive(Debug, Clone, Copy, Default)]
pub struct TlsConnection;

/// Read-only snapshot of one request, as seen by the enforcer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestView {
    scheme: Scheme,
    host: String,
    path: String,
    query: Option<String>,
    method: String,
    user_agent: Option<String>,
    environment: Option<String>,
}

impl Default for RequestView {
    fn default() -> Self {
        Self {
            scheme: Scheme::Http,
            host: String::new(),
            path: "/".to_string(),
            query: None,
            method: "GET".to_string(),
            user_agent: None,
            environment: None,
        }
    }
}

impl RequestView {
    /// Create a builder for `RequestView`.
    #[must_use]
    pub fn builder() -> RequestViewBuilder {
        RequestViewBuilder::default()
    }

    /// Snapshot an HTTP request.
    ///
    /// `environment` is the deployment environment resolved by the caller;
    /// the enforcer never reads process state itself.
    pub fn from_request<B>(req: &Request<B>, environment: Option<&str>) -> Self {
        let host = req
            .uri()
            .host()
            .map(str::to_string)
            .or_else(|| {
                req.headers()
                    .get(header::HOST)
                    .and_then(|h| h.to_str().ok())
                    .and_then(|h| h.parse::<Authority>().ok())
                    .map(|a| a.host().to_string())
            })
            .unwrap_or_default();

        let user_agent = req
            .headers()
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Self {
            scheme: detect_scheme(req),
            host,
            path: req.uri().path().to_string(),
            query: req.uri().query().map(str::to_string),
            method: req.method().as_str().to_string(),
            user_agent,
            environment: environment.map(str::to_string),
        }
    }

    #[must_use]
    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    #[must_use]
    pub fn is_encrypted(&self) -> bool {
        self.scheme == Scheme::Https
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Path plus `?query` when the query is non-empty.
    #[must_use]
    pub fn full_path(&self) -> String {
        match self.query.as_deref() {
            Some(q) if !q.is_empty() => format!("{}?{}", self.path, q),
            _ => self.path.clone(),
        }
    }

    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    #[must_use]
    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    #[must_use]
    pub fn environment(&self) -> Option<&str> {
        self.environment.as_deref()
    }
}

/// Builder for `RequestView`.
#[derive(Debug, Default)]
pub struct RequestViewBuilder {
    view: RequestView,
}

impl RequestViewBuilder {
    #[must_use]
    pub fn scheme(mut self, scheme: Scheme) -> Self {
        self.view.scheme = scheme;
        self
    }

    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.view.host = host.into();
        self
    }

    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.view.path = path.into();
        self
    }

    #[must_use]
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.view.query = Some(query.into());
        self
    }

    #[must_use]
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.view.method = method.into();
        self
    }

    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.view.user_agent = Some(agent.into());
        self
    }

    #[must_use]
    pub fn environment(mut self, environment: impl Into<String>) -> Self {
        self.view.environment = Some(environment.into());
        self
    }

    #[must_use]
    pub fn build(self) -> RequestView {
        self.view
    }
}

/// Effective scheme of the request.
///
/// Encrypted when the TLS listener marked the connection, when the proxy sent
/// `X-SSL-Request: on`, or when the first `X-Forwarded-Proto` value is https.
/// Otherwise the first forwarded value, then the request URI's own scheme.
fn detect_scheme<B>(req: &Request<B>) -> Scheme {
    if req.extensions().get::<TlsConnection>().is_some() {
        return Scheme::Https;
    }

    let ssl_flag = req
        .headers()
        .get(X_SSL_REQUEST)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().eq_ignore_ascii_case("on"))
        .unwrap_or(false);
    if ssl_flag {
        return Scheme::Https;
    }

    let forwarded = req
        .headers()
        .get(X_FORWARDED_PROTO)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim);
    if let Some(proto) = forwarded {
        return Scheme::from_proto(proto);
    }

    match req.uri().scheme_str() {
        Some(s) => Scheme::from_proto(s),
        None => Scheme::Http,
    }
}
