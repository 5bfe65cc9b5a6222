//! ssl-enforcer gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────┐
//!   http  :8080 ──┼─▶ enforce_scheme ──▶ app_handler ──▶ upstream │
//!   https :8443 ──┼─▶ (TlsConnection)      │                      │
//!                 │        │               └─▶ built-in responder │
//!                 │        └─▶ 301/302/... redirect, or 400        │
//!                 └──────────────────────────────────────────────┘
//! ```

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use ssl_enforcer::config::load_config;
use ssl_enforcer::http::HttpServer;
use ssl_enforcer::lifecycle::{signals, Shutdown};
use ssl_enforcer::net::tls::load_tls_config;
use ssl_enforcer::observability::{logging, metrics};
use ssl_enforcer::GatewayConfig;

#[derive(Parser, Debug)]
#[command(name = "ssl-enforcer", version, about = "HTTPS-enforcing front gateway")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };
    if config.environment.is_none() {
        config.environment = env::var("APP_ENV").or_else(|_| env::var("ENV")).ok();
    }

    logging::init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = ?cli.config,
        environment = ?config.environment,
        "ssl-enforcer starting"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr);
    }

    let tls = match &config.tls {
        Some(tls) => {
            let addr: SocketAddr = tls.bind_address.parse()?;
            Some((addr, load_tls_config(tls).await?))
        }
        None => None,
    };

    let server = HttpServer::new(config)?;
    let listener = TcpListener::bind(&server.config().listener.bind_address).await?;
    let shutdown = Shutdown::new();

    let plain = {
        let rx = shutdown.subscribe();
        let server = &server;
        async move { server.run(listener, rx).await }
    };
    let encrypted = {
        let rx = shutdown.subscribe();
        let server = &server;
        async move {
            match tls {
                Some((addr, tls)) => server.run_tls(addr, tls, rx).await,
                None => Ok(()),
            }
        }
    };
    let signalled = shutdown.clone();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        signalled.trigger();
    });

    tokio::try_join!(plain, encrypted)?;

    tracing::info!("Shutdown complete");
    Ok(())
}
