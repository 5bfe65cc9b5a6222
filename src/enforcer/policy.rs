//! Scheme decision.
//!
//! # Responsibilities
//! - Turn the constraint result and the enforcement mode into a target scheme
//! - Detect a mismatch against the canonical redirect host
//!
//! # Design Decisions
//! - Upgrade wins over downgrade: a request that must be encrypted is never
//!   sent back to plaintext
//! - Host mismatch alone is enough to redirect, even on the right scheme

use std::fmt;

use crate::enforcer::evaluator::ConstraintSet;
use crate::http::request::RequestView;

/// Transport scheme of a request or redirect target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }

    /// Conventional port (80 / 443).
    pub fn default_port(self) -> u16 {
        match self {
            Scheme::Http => 80,
            Scheme::Https => 443,
        }
    }

    /// Interpret a forwarded protocol or URI scheme; anything but https is plaintext.
    pub fn from_proto(proto: &str) -> Self {
        if proto.eq_ignore_ascii_case("https") {
            Scheme::Https
        } else {
            Scheme::Http
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How requests outside the enforced set are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Leave them on whatever scheme they arrived on.
    #[default]
    Default,
    /// Send every encrypted request outside the enforced set back to http.
    Strict,
    /// Like `Strict`, except PUT and POST are left alone.
    Mixed,
}

impl Mode {
    /// Whether an encrypted request with this method should be downgraded.
    pub fn enforce_non_ssl(self, method: &str) -> bool {
        match self {
            Mode::Default => false,
            Mode::Strict => true,
            Mode::Mixed => !matches!(method, "PUT" | "POST"),
        }
    }
}

/// Outcome of the scheme policy for one request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Decision {
    /// Scheme to switch to, set only when it differs from the current one.
    pub scheme: Option<Scheme>,
    /// Canonical host to switch to, set only when it differs from the current one.
    pub host: Option<String>,
}

impl Decision {
    pub fn passthrough() -> Self {
        Self::default()
    }

    pub fn redirect_required(&self) -> bool {
        self.scheme.is_some() || self.host.is_some()
    }
}

/// Whether the encrypted scheme is required for this request.
///
/// Without any configured constraint every request is enforced, except in
/// strict mode: there the enforced set must be selected explicitly.
pub fn scheme_required(constraints: &ConstraintSet, mode: Mode, view: &RequestView) -> bool {
    if constraints.is_unconstrained() && mode == Mode::Strict {
        return false;
    }
    constraints.enforcement_active(view)
}

/// Decide whether the request must move to another scheme or host.
pub fn decide(
    constraints: &ConstraintSet,
    mode: Mode,
    canonical_host: Option<&str>,
    view: &RequestView,
) -> Decision {
    let current = view.scheme();
    let desired = if scheme_required(constraints, mode, view) {
        Some(Scheme::Https)
    } else if mode.enforce_non_ssl(view.method()) {
        Some(Scheme::Http)
    } else {
        None
    };

    Decision {
        scheme: desired.filter(|scheme| *scheme != current),
        host: canonical_host
            .filter(|host| !host.eq_ignore_ascii_case(view.host()))
            .map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enforcer::rule::{ConstraintKey, Rule};

    fn view(scheme: Scheme, method: &str, path: &str) -> RequestView {
        RequestView::builder()
            .scheme(scheme)
            .host("www.example.org")
            .method(method)
            .path(path)
            .build()
    }

    #[test]
    fn test_upgrade_plaintext() {
        let set = ConstraintSet::new();
        let d = decide(&set, Mode::Default, None, &view(Scheme::Http, "GET", "/"));
        assert_eq!(d.scheme, Some(Scheme::Https));
        assert!(d.redirect_required());

        let d = decide(&set, Mode::Default, None, &view(Scheme::Https, "GET", "/"));
        assert_eq!(d, Decision::passthrough());
    }

    #[test]
    fn test_strict_downgrades_outside_enforced_set() {
        let set = ConstraintSet::new().with_rules(ConstraintKey::Only, vec![Rule::literal("/login")]);
        let d = decide(&set, Mode::Strict, None, &view(Scheme::Https, "GET", "/foo"));
        assert_eq!(d.scheme, Some(Scheme::Http));

        let d = decide(&set, Mode::Strict, None, &view(Scheme::Https, "GET", "/login"));
        assert!(!d.redirect_required());

        let d = decide(&set, Mode::Default, None, &view(Scheme::Https, "GET", "/foo"));
        assert!(!d.redirect_required());
    }

    #[test]
    fn test_strict_without_constraints_downgrades_everything() {
        let set = ConstraintSet::new();
        let d = decide(&set, Mode::Strict, None, &view(Scheme::Https, "GET", "/"));
        assert_eq!(d.scheme, Some(Scheme::Http));

        let d = decide(&set, Mode::Strict, None, &view(Scheme::Http, "GET", "/"));
        assert!(!d.redirect_required());

    }

    #[test]
    fn test_mixed_without_constraints_upgrades() {
        let set = ConstraintSet::new();
        let d = decide(&set, Mode::Mixed, None, &view(Scheme::Http, "POST", "/"));
        assert_eq!(d.scheme, Some(Scheme::Https));

        let d = decide(&set, Mode::Mixed, None, &view(Scheme::Http, "GET", "/"));
        assert_eq!(d.scheme, Some(Scheme::Https));

        let d = decide(&set, Mode::Mixed, None, &view(Scheme::Https, "GET", "/"));
        assert!(!d.redirect_required());
    }

    #[test]
    fn test_mixed_keeps_put_and_post() {
        assert!(Mode::Mixed.enforce_non_ssl("GET"));
        assert!(Mode::Mixed.enforce_non_ssl("DELETE"));
        assert!(!Mode::Mixed.enforce_non_ssl("POST"));
        assert!(!Mode::Mixed.enforce_non_ssl("PUT"));
        assert!(Mode::Strict.enforce_non_ssl("POST"));
        assert!(!Mode::Default.enforce_non_ssl("GET"));
    }

    #[test]
    fn test_host_mismatch_alone_redirects() {
        let set = ConstraintSet::new();
        let d = decide(&set, Mode::Default, Some("www.google.com"), &view(Scheme::Https, "GET", "/"));
        assert_eq!(d.scheme, None);
        assert_eq!(d.host.as_deref(), Some("www.google.com"));
        assert!(d.redirect_required());

        let d = decide(&set, Mode::Default, Some("WWW.example.org"), &view(Scheme::Https, "GET", "/"));
        assert!(!d.redirect_required());
    }

    #[test]
    fn test_scheme_parsing() {
        assert_eq!(Scheme::from_proto("HTTPS"), Scheme::Https);
        assert_eq!(Scheme::from_proto("http"), Scheme::Http);
        assert_eq!(Scheme::from_proto("wss"), Scheme::Http);
        assert_eq!(Scheme::Https.default_port(), 443);
        assert_eq!(Scheme::Http.to_string(), "http");
    }
}
