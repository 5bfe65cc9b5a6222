//! Redirect target construction.
//!
//! # Responsibilities
//! - Rebuild `scheme://host[:port]/path?query` for the decided scheme and host
//! - Emit a port only for a custom, non-default port of the target scheme
//! - Refuse to emit a location that is not a valid absolute URI
//!
//! # Design Decisions
//! - The location is assembled as a string so path and query stay byte-identical;
//!   `url` only validates the result
//! - The port the request arrived on is never carried over

use std::fmt::Write;

use thiserror::Error;
use url::Url;

use crate::enforcer::policy::{Decision, Scheme};
use crate::http::request::RequestView;

/// Failure to build a redirect location; answered with 400 for that request.
#[derive(Debug, Error)]
pub enum RedirectError {
    #[error("request carries no host to redirect to")]
    MissingHost,
    #[error("invalid redirect location '{location}': {source}")]
    InvalidLocation {
        location: String,
        #[source]
        source: url::ParseError,
    },
}

/// Custom listener ports advertised in redirects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ports {
    pub http: Option<u16>,
    pub https: Option<u16>,
}

impl Ports {
    /// Port to render for `scheme`, or `None` when it is the default.
    pub fn for_scheme(&self, scheme: Scheme) -> Option<u16> {
        let port = match scheme {
            Scheme::Http => self.http,
            Scheme::Https => self.https,
        };
        port.filter(|p| *p != scheme.default_port())
    }
}

/// Build the `Location` for a redirect.
pub fn build_redirect_location(
    view: &RequestView,
    decision: &Decision,
    ports: &Ports,
) -> Result<String, RedirectError> {
    let scheme = decision.scheme.unwrap_or_else(|| view.scheme());
    let host = decision.host.as_deref().unwrap_or_else(|| view.host());
    if host.is_empty() {
        return Err(RedirectError::MissingHost);
    }

    let mut location = format!("{}://{}", scheme, host);
    if let Some(port) = decision.scheme.and_then(|s| ports.for_scheme(s)) {
        let _ = write!(location, ":{}", port);
    }
    location.push_str(&view.full_path());

    match Url::parse(&location) {
        Ok(url) if url.host_str().is_some() => Ok(location),
        Ok(_) => Err(RedirectError::MissingHost),
        Err(source) => Err(RedirectError::InvalidLocation { location, source }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enforcer::evaluator::ConstraintSet;
    use crate::enforcer::policy::{decide, Mode};

    fn view(scheme: Scheme, host: &str, path: &str, query: Option<&str>) -> RequestView {
        let mut b = RequestView::builder().scheme(scheme).host(host).path(path);
        if let Some(q) = query {
            b = b.query(q);
        }
        b.build()
    }

    fn upgrade() -> Decision {
        Decision {
            scheme: Some(Scheme::Https),
            host: None,
        }
    }

    #[test]
    fn test_scheme_swap_keeps_path_and_query() {
        let v = view(Scheme::Http, "www.example.org", "/admin", Some("token=33"));
        let loc = build_redirect_location(&v, &upgrade(), &Ports::default()).unwrap();
        assert_eq!(loc, "https://www.example.org/admin?token=33");
    }

    #[test]
    fn test_path_bytes_preserved() {
        let v = view(Scheme::Http, "example.org", "/a/../b%20c", Some("q=%2F&x"));
        let loc = build_redirect_location(&v, &upgrade(), &Ports::default()).unwrap();
        assert_eq!(loc, "https://example.org/a/../b%20c?q=%2F&x");
    }

    #[test]
    fn test_custom_port() {
        let v = view(Scheme::Http, "www.example.org", "/", None);
        let ports = Ports { http: None, https: Some(9443) };
        let loc = build_redirect_location(&v, &upgrade(), &ports).unwrap();
        assert_eq!(loc, "https://www.example.org:9443/");

        let v = view(Scheme::Https, "www.example.org", "/", None);
        let ports = Ports { http: Some(8080), https: None };
        let d = Decision { scheme: Some(Scheme::Http), host: None };
        let loc = build_redirect_location(&v, &d, &ports).unwrap();
        assert_eq!(loc, "http://www.example.org:8080/");
    }

    #[test]
    fn test_default_port_omitted() {
        let v = view(Scheme::Http, "example.org", "/", None);
        let ports = Ports { http: Some(80), https: Some(443) };
        let loc = build_redirect_location(&v, &upgrade(), &ports).unwrap();
        assert_eq!(loc, "https://example.org/");
    }

    #[test]
    fn test_port_ignored_without_scheme_change() {
        let v = view(Scheme::Https, "www.example.org", "/x", None);
        let ports = Ports { http: None, https: Some(9443) };
        let d = Decision { scheme: None, host: Some("www.google.com".into()) };
        let loc = build_redirect_location(&v, &d, &ports).unwrap();
        assert_eq!(loc, "https://www.google.com/x");
    }

    #[test]
    fn test_host_override_with_scheme_change() {
        let v = view(Scheme::Http, "www.example.org", "/admin", Some("token=33"));
        let d = Decision {
            scheme: Some(Scheme::Https),
            host: Some("www.google.com".into()),
        };
        let loc = build_redirect_location(&v, &d, &Ports::default()).unwrap();
        assert_eq!(loc, "https://www.google.com/admin?token=33");
    }

    #[test]
    fn test_missing_host_is_error() {
        let v = view(Scheme::Http, "", "/", None);
        let err = build_redirect_location(&v, &upgrade(), &Ports::default()).unwrap_err();
        assert!(matches!(err, RedirectError::MissingHost));
    }

    #[test]
    fn test_invalid_host_is_error() {
        let v = view(Scheme::Http, "exa mple.org", "/", None);
        let err = build_redirect_location(&v, &upgrade(), &Ports::default()).unwrap_err();
        assert!(matches!(err, RedirectError::InvalidLocation { .. }));
    }

    #[test]
    fn test_own_output_is_fixed_point() {
        let set = ConstraintSet::new();
        let v = view(Scheme::Http, "example.org", "/x", Some("y=1"));
        let first = build_redirect_location(&v, &decide(&set, Mode::Default, None, &v), &Ports::default()).unwrap();

        let url = Url::parse(&first).unwrap();
        let mut b = RequestView::builder()
            .scheme(Scheme::from_proto(url.scheme()))
            .host(url.host_str().unwrap())
            .path(url.path());
        if let Some(q) = url.query() {
            b = b.query(q);
        }
        let redirected = b.build();

        let decision = decide(&set, Mode::Default, None, &redirected);
        assert!(!decision.redirect_required());
        let second = build_redirect_location(&redirected, &decision, &Ports::default()).unwrap();
        assert_eq!(first, second);
    }
}
