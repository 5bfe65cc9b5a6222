//! Enforcer options.
//!
//! Plain record of everything an enforcer can be configured with. Built in
//! code or from the `[enforcer]` table of the gateway config, then validated
//! once by [`Enforcer::new`](crate::enforcer::Enforcer::new).

use std::sync::Arc;

use crate::enforcer::headers::HstsPolicy;
use crate::enforcer::rule::{MethodPathRule, Rule};
use crate::http::request::RequestView;

/// Side effect run once, right before a redirect response is returned.
pub type RedirectHook = Arc<dyn Fn(&RequestView) + Send + Sync>;

/// Body sent with a redirect response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RedirectBody {
    /// Small HTML page linking to the new location.
    #[default]
    Default,
    Empty,
    Text(String),
    /// Concatenated in order.
    Parts(Vec<String>),
}

impl RedirectBody {
    pub fn render(&self, location: &str) -> String {
        match self {
            RedirectBody::Default => format!(
                "<html><body>You are being <a href=\"{}\">redirected</a>.</body></html>",
                escape_html(location)
            ),
            RedirectBody::Empty => String::new(),
            RedirectBody::Text(text) => text.clone(),
            RedirectBody::Parts(parts) => parts.concat(),
        }
    }
}

// The location carries request-derived path and query text.
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Unvalidated enforcer configuration. Empty rule lists mean "not configured".
#[derive(Clone)]
pub struct EnforcerOptions {
    pub only: Vec<Rule>,
    pub except: Vec<Rule>,
    pub only_hosts: Vec<Rule>,
    pub except_hosts: Vec<Rule>,
    pub only_methods: Vec<Rule>,
    pub except_methods: Vec<Rule>,
    pub only_method_paths: Vec<MethodPathRule>,
    pub except_method_paths: Vec<MethodPathRule>,
    pub only_environments: Vec<Rule>,
    pub except_environments: Vec<Rule>,
    pub only_agents: Vec<Rule>,
    pub except_agents: Vec<Rule>,
    pub ignore: Vec<Rule>,

    /// Downgrade encrypted requests outside the enforced set.
    pub strict: bool,
    /// Like `strict`, but PUT and POST are never downgraded.
    pub mixed: bool,

    /// Canonical host (or URL) every redirect points at.
    pub redirect_to: Option<String>,
    pub redirect_code: u16,
    pub http_port: Option<u16>,
    pub https_port: Option<u16>,

    pub hsts: Option<HstsPolicy>,
    pub force_secure_cookies: bool,
    pub redirect_body: RedirectBody,
    pub before_redirect: Option<RedirectHook>,
}

impl Default for EnforcerOptions {
    fn default() -> Self {
        Self {
            only: Vec::new(),
            except: Vec::new(),
            only_hosts: Vec::new(),
            except_hosts: Vec::new(),
            only_methods: Vec::new(),
            except_methods: Vec::new(),
            only_method_paths: Vec::new(),
            except_method_paths: Vec::new(),
            only_environments: Vec::new(),
            except_environments: Vec::new(),
            only_agents: Vec::new(),
            except_agents: Vec::new(),
            ignore: Vec::new(),
            strict: false,
            mixed: false,
            redirect_to: None,
            redirect_code: 301,
            http_port: None,
            https_port: None,
            hsts: None,
            force_secure_cookies: true,
            redirect_body: RedirectBody::Default,
            before_redirect: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_bodies() {
        assert_eq!(
            RedirectBody::Default.render("https://www.example.org/"),
            "<html><body>You are being <a href=\"https://www.example.org/\">redirected</a>.</body></html>"
        );
        assert_eq!(RedirectBody::Empty.render("https://x/"), "");
        assert_eq!(RedirectBody::Text("Hello!".into()).render("https://x/"), "Hello!");
        let parts = RedirectBody::Parts(vec!["<html>".into(), "<body>".into(), "Hello!".into()]);
        assert_eq!(parts.render("https://x/"), "<html><body>Hello!");
    }

    #[test]
    fn test_default_body_escapes_location() {
        assert_eq!(
            RedirectBody::Default.render("https://x/a\"onmouseover=x?a=1&b=<i>"),
            "<html><body>You are being <a href=\"https://x/a&quot;onmouseover=x?a=1&amp;b=&lt;i&gt;\">redirected</a>.</body></html>"
        );
    }
}
