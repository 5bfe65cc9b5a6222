//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the axum Router: application handler under the enforcement middleware
//! - Wire up timeout and trace layers
//! - Serve the plaintext listener and, optionally, the TLS listener
//! - Forward requests to the upstream application, or answer directly
//! - Stop both listeners on the shared shutdown signal

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{
        uri::{Authority, PathAndQuery, Scheme},
        StatusCode, Uri,
    },
    response::{IntoResponse, Response},
    routing::any,
    Extension, Router,
};
use axum_server::{tls_rustls::RustlsConfig, Handle};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::validation::upstream_authority;
use crate::config::{ConfigError, GatewayConfig, UpstreamConfig};
use crate::http::middleware::{enforce, EnforcerState};
use crate::http::request::TlsConnection;
use crate::lifecycle::shutdown;

/// Grace period for in-flight TLS connections after shutdown.
const TLS_DRAIN_SECS: u64 = 10;

/// Application state injected into the inner handler.
#[derive(Clone)]
pub struct AppState {
    upstream: Option<Upstream>,
}

#[derive(Clone)]
struct Upstream {
    client: Client<HttpConnector, Body>,
    authority: Authority,
}

impl Upstream {
    fn new(config: &UpstreamConfig, connect_timeout: Duration) -> Result<Self, ConfigError> {
        let authority =
            upstream_authority(&config.address).map_err(|e| ConfigError::Validation(vec![e]))?;

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(connect_timeout));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        Ok(Self { client, authority })
    }
}

/// HTTP server for the enforcing gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, ConfigError> {
        let enforcer = config.build_enforcer()?;
        let enforcer_state = EnforcerState::new(enforcer, config.environment.as_deref());

        let connect_timeout = Duration::from_secs(config.timeouts.connect_secs);
        let upstream = config
            .upstream
            .as_ref()
            .map(|u| Upstream::new(u, connect_timeout))
            .transpose()?;

        let router = Self::build_router(&config, AppState { upstream }, enforcer_state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState, enforcer: EnforcerState) -> Router {
        let app = Router::new()
            .route("/", any(app_handler))
            .route("/{*path}", any(app_handler))
            .with_state(state);

        enforce(app, enforcer)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
    }

    /// Router serving plaintext connections.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Router serving connections this process decrypted itself.
    pub fn tls_router(&self) -> Router {
        self.router.clone().layer(Extension(TlsConnection))
    }

    /// Serve plaintext HTTP until `shutdown` fires.
    pub async fn run(
        &self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP listener starting");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        tracing::info!(address = %addr, "HTTP listener stopped");
        Ok(())
    }

    /// Serve HTTPS on `addr` until `shutdown` fires.
    pub async fn run_tls(
        &self,
        addr: SocketAddr,
        tls: RustlsConfig,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), io::Error> {
        tracing::info!(address = %addr, "HTTPS listener starting");

        let handle = Handle::new();
        let drain = handle.clone();
        tokio::spawn(async move {
            shutdown::wait(shutdown).await;
            drain.graceful_shutdown(Some(Duration::from_secs(TLS_DRAIN_SECS)));
        });

        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(self.tls_router().into_make_service())
            .await?;

        tracing::info!(address = %addr, "HTTPS listener stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Inner application: the upstream, or a fixed greeting without one.
async fn app_handler(State(state): State<AppState>, request: Request) -> Response {
    match &state.upstream {
        Some(upstream) => forward(upstream, request).await,
        None => (StatusCode::OK, "Hello world!").into_response(),
    }
}

async fn forward(upstream: &Upstream, request: Request) -> Response {
    let (mut parts, body) = request.into_parts();

    let mut uri_parts = parts.uri.clone().into_parts();
    uri_parts.scheme = Some(Scheme::HTTP);
    uri_parts.authority = Some(upstream.authority.clone());
    if uri_parts.path_and_query.is_none() {
        uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }
    parts.uri = match Uri::from_parts(uri_parts) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::error!(error = %e, "Cannot build upstream URI");
            return (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response();
        }
    };

    tracing::debug!(method = %parts.method, uri = %parts.uri, "Forwarding request");

    match upstream.client.request(Request::from_parts(parts, body)).await {
        Ok(response) => {
            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(upstream = %upstream.authority, error = %e, "Upstream error");
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}
