//! End-to-end tests for the gateway binary's server over real TCP.

use std::net::SocketAddr;
use std::time::Duration;

use ssl_enforcer::config::parse_config;
use ssl_enforcer::http::HttpServer;
use ssl_enforcer::lifecycle::Shutdown;
use tokio::net::TcpListener;

mod common;

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_gateway_enforces_and_forwards() {
    let backend_addr: SocketAddr = "127.0.0.1:28281".parse().unwrap();
    let gateway_addr: SocketAddr = "127.0.0.1:28282".parse().unwrap();
    common::start_mock_backend(backend_addr, "from upstream").await;

    let config = parse_config(&format!(
        r#"
        [listener]
        bind_address = "{gateway_addr}"

        [upstream]
        address = "{backend_addr}"

        [enforcer]
        ignore = "/health"
        hsts = true
        "#
    ))
    .unwrap();

    let server = HttpServer::new(config).unwrap();
    let listener = TcpListener::bind(gateway_addr).await.unwrap();
    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    let handle = tokio::spawn(async move { server.run(listener, rx).await });

    let client = client();
    let base = format!("http://{}", gateway_addr);

    // Plaintext: redirected, the upstream never sees it.
    let res = client.get(format!("{}/account?id=7", base)).send().await.unwrap();
    assert_eq!(res.status(), 301);
    assert_eq!(
        res.headers()["location"],
        "https://127.0.0.1/account?id=7"
    );

    // Terminated upstream of the gateway: forwarded and post-processed.
    let res = client
        .get(format!("{}/account", base))
        .header("x-forwarded-proto", "https")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["set-cookie"], "id=1; path=/; secure");
    assert_eq!(
        res.headers()["strict-transport-security"],
        "max-age=31536000; includeSubDomains"
    );
    assert_eq!(res.text().await.unwrap(), "from upstream");

    // Ignored: forwarded untouched even over plaintext.
    let res = client.get(format!("{}/health", base)).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["set-cookie"], "id=1; path=/");

    shutdown.trigger();
    let result = tokio::time::timeout(Duration::from_secs(5), handle).await.unwrap();
    assert!(result.unwrap().is_ok());
}

#[tokio::test]
async fn test_gateway_upstream_down() {
    let gateway_addr: SocketAddr = "127.0.0.1:28283".parse().unwrap();
    let config = parse_config(&format!(
        r#"
        [listener]
        bind_address = "{gateway_addr}"

        [upstream]
        address = "127.0.0.1:28284"

        [timeouts]
        connect_secs = 1
        "#
    ))
    .unwrap();

    let server = HttpServer::new(config).unwrap();
    let listener = TcpListener::bind(gateway_addr).await.unwrap();
    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    let handle = tokio::spawn(async move { server.run(listener, rx).await });

    let res = client()
        .get(format!("http://{}/", gateway_addr))
        .header("x-ssl-request", "on")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 502);

    shutdown.trigger();
    let result = tokio::time::timeout(Duration::from_secs(5), handle).await.unwrap();
    assert!(result.unwrap().is_ok());
}
