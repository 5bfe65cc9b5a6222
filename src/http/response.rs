//! Responses produced by the enforcer itself.
//!
//! # Responsibilities
//! - Render a redirect (status, `Location`, `text/html` body)
//! - Render the 400 answered when no redirect location can be built

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::enforcer::Redirect;

impl IntoResponse for Redirect {
    fn into_response(self) -> Response {
        let location = match HeaderValue::from_str(&self.location) {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(location = %self.location, "Redirect location is not a valid header value");
                return bad_request();
            }
        };

        let mut response = (
            self.status,
            [(header::CONTENT_TYPE, "text/html")],
            self.body,
        )
            .into_response();
        response.headers_mut().insert(header::LOCATION, location);
        response
    }
}

/// 400 with an empty `text/plain` body.
pub fn bad_request() -> Response {
    (
        StatusCode::BAD_REQUEST,
        [(header::CONTENT_TYPE, "text/plain")],
        "",
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enforcer::Scheme;

    #[tokio::test]
    async fn test_redirect_response() {
        let response = Redirect {
            scheme: Scheme::Https,
            status: StatusCode::FOUND,
            location: "https://example.org/a?b=c".into(),
            body: "moved".into(),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "https://example.org/a?b=c");
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/html");
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"moved");
    }

    #[tokio::test]
    async fn test_bad_request() {
        let response = bad_request();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.is_empty());
    }
}
