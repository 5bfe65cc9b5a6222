//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;

use axum::{
    body::Body,
    http::{header::SET_COOKIE, HeaderMap, Request, StatusCode},
    response::{AppendHeaders, IntoResponse},
    routing::any,
    Router,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tower::ServiceExt;

use ssl_enforcer::enforcer::{Enforcer, EnforcerOptions};
use ssl_enforcer::http::{enforce, EnforcerState};

pub const HELLO: &str = "Hello world!";

/// Application under test: greets and sets one plain and one secure cookie.
async fn hello() -> impl IntoResponse {
    (
        AppendHeaders([
            (SET_COOKIE, "id=1; path=/"),
            (SET_COOKIE, "token=abc; path=/; secure; HttpOnly"),
        ]),
        HELLO,
    )
}

/// The test application behind an enforcer built from `options`.
pub fn app(options: EnforcerOptions) -> Router {
    app_in(options, None)
}

/// Like [`app`], running in deployment environment `environment`.
pub fn app_in(options: EnforcerOptions, environment: Option<&str>) -> Router {
    let enforcer = Enforcer::new(options).unwrap();
    let inner = Router::new()
        .route("/", any(hello))
        .route("/{*path}", any(hello));
    enforce(inner, EnforcerState::new(enforcer, environment))
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn location(&self) -> Option<&str> {
        self.headers.get("location").and_then(|v| v.to_str().ok())
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn cookies(&self) -> Vec<String> {
        self.headers
            .get_all(SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }

    /// Asserts the request reached the application untouched.
    pub fn assert_passed_through(&self) {
        assert_eq!(self.status, StatusCode::OK);
        assert_eq!(self.body, HELLO);
    }

    pub fn assert_redirect(&self, status: u16, location: &str) {
        assert_eq!(self.status.as_u16(), status);
        assert_eq!(self.location(), Some(location));
    }
}

/// Drive one request through `app`.
pub async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    TestResponse {
        status,
        headers,
        body: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}

/// `method` an absolute-form `url` with extra `headers`.
pub async fn request_with(
    app: &Router,
    method: &str,
    url: &str,
    headers: &[(&str, &str)],
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(url);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    send(app, builder.body(Body::empty()).unwrap()).await
}

pub async fn get(app: &Router, url: &str) -> TestResponse {
    request_with(app, "GET", url, &[]).await
}

pub async fn post(app: &Router, url: &str) -> TestResponse {
    request_with(app, "POST", url, &[]).await
}

pub async fn put(app: &Router, url: &str) -> TestResponse {
    request_with(app, "PUT", url, &[]).await
}

/// Start a simple mock backend that returns a fixed response with a cookie.
pub async fn start_mock_backend(addr: SocketAddr, response: &'static str) {
    let listener = TcpListener::bind(addr).await.unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let response_str = format!(
                    "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nSet-Cookie: id=1; path=/\r\nConnection: close\r\n\r\n{}",
                    response.len(),
                    response
                );
                let _ = socket.write_all(response_str.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });
}
