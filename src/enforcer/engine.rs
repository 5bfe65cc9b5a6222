//! The scheme enforcer.
//!
//! # Responsibilities
//! - Hold validated, immutable configuration
//! - Evaluate one request: ignore, redirect, reject or forward
//! - Post-process the response of an encrypted forwarded request
//!
//! # Design Decisions
//! - Built once, shared via `Arc`; no interior mutability
//! - The before-redirect hook runs only once a valid location exists

use axum::http::{HeaderMap, StatusCode};

use crate::config::loader::ConfigError;
use crate::config::validation::{validate_options, ValidationError};
use crate::enforcer::evaluator::ConstraintSet;
use crate::enforcer::headers::{apply_hsts, secure_cookies, HstsPolicy};
use crate::enforcer::options::{EnforcerOptions, RedirectBody, RedirectHook};
use crate::enforcer::policy::{decide, scheme_required, Decision, Mode, Scheme};
use crate::enforcer::rewrite::{build_redirect_location, Ports, RedirectError};
use crate::enforcer::rule::{ConstraintKey, Polarity};
use crate::http::request::RequestView;

/// A redirect the enforcer wants returned instead of the application response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub scheme: Scheme,
    pub status: StatusCode,
    pub location: String,
    pub body: String,
}

/// What to do with one request.
#[derive(Debug)]
pub enum Outcome {
    /// An `ignore` rule matched; forward untouched.
    Ignored,
    /// Forward; post-process the response when `encrypted`.
    Forward { encrypted: bool },
    Redirect(Redirect),
    /// The redirect location could not be built; answer 400.
    Rejected(RedirectError),
}

/// Scheme enforcement engine.
#[derive(Clone)]
pub struct Enforcer {
    constraints: ConstraintSet,
    mode: Mode,
    canonical_host: Option<String>,
    redirect_code: StatusCode,
    ports: Ports,
    hsts: Option<HstsPolicy>,
    force_secure_cookies: bool,
    redirect_body: RedirectBody,
    before_redirect: Option<RedirectHook>,
}

impl Enforcer {
    /// Validate options and build the enforcer.
    pub fn new(options: EnforcerOptions) -> Result<Self, ConfigError> {
        let canonical_host = validate_options(&options).map_err(ConfigError::Validation)?;
        let redirect_code = StatusCode::from_u16(options.redirect_code).map_err(|_| {
            ConfigError::Validation(vec![ValidationError::UnsupportedRedirectCode(
                options.redirect_code,
            )])
        })?;

        let mode = if options.strict {
            Mode::Strict
        } else if options.mixed {
            Mode::Mixed
        } else {
            Mode::Default
        };

        if !options.force_secure_cookies {
            tracing::warn!(
                "force_secure_cookies is disabled: cookies set over https can leak over plain http"
            );
        }

        let constraints = ConstraintSet::new()
            .with_rules(ConstraintKey::Only, options.only)
            .with_rules(ConstraintKey::Except, options.except)
            .with_rules(ConstraintKey::OnlyHosts, options.only_hosts)
            .with_rules(ConstraintKey::ExceptHosts, options.except_hosts)
            .with_rules(ConstraintKey::OnlyMethods, options.only_methods)
            .with_rules(ConstraintKey::ExceptMethods, options.except_methods)
            .with_rules(ConstraintKey::OnlyEnvironments, options.only_environments)
            .with_rules(ConstraintKey::ExceptEnvironments, options.except_environments)
            .with_rules(ConstraintKey::OnlyAgents, options.only_agents)
            .with_rules(ConstraintKey::ExceptAgents, options.except_agents)
            .with_rules(ConstraintKey::Ignore, options.ignore)
            .with_method_paths(Polarity::Only, options.only_method_paths)
            .with_method_paths(Polarity::Except, options.except_method_paths);

        tracing::debug!(
            mode = ?mode,
            canonical_host = ?canonical_host,
            redirect_code = redirect_code.as_u16(),
            hsts = options.hsts.is_some(),
            "Enforcer configured"
        );

        Ok(Self {
            constraints,
            mode,
            canonical_host,
            redirect_code,
            ports: Ports {
                http: options.http_port,
                https: options.https_port,
            },
            hsts: options.hsts,
            force_secure_cookies: options.force_secure_cookies,
            redirect_body: options.redirect_body,
            before_redirect: options.before_redirect,
        })
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Whether the encrypted scheme is required for this request.
    pub fn enforcement_active(&self, view: &RequestView) -> bool {
        scheme_required(&self.constraints, self.mode, view)
    }

    /// Scheme/host decision, without looking at `ignore` rules.
    pub fn decide(&self, view: &RequestView) -> Decision {
        decide(&self.constraints, self.mode, self.canonical_host.as_deref(), view)
    }

    /// Location a redirect for `decision` would point at.
    pub fn redirect_location(
        &self,
        view: &RequestView,
        decision: &Decision,
    ) -> Result<String, RedirectError> {
        build_redirect_location(view, decision, &self.ports)
    }

    /// Evaluate one request.
    pub fn evaluate(&self, view: &RequestView) -> Outcome {
        if self.constraints.is_ignored(view) {
            return Outcome::Ignored;
        }

        let decision = self.decide(view);
        if !decision.redirect_required() {
            return Outcome::Forward {
                encrypted: view.is_encrypted(),
            };
        }

        match self.redirect_location(view, &decision) {
            Ok(location) => {
                if let Some(hook) = &self.before_redirect {
                    hook(view);
                }
                Outcome::Redirect(Redirect {
                    scheme: decision.scheme.unwrap_or(view.scheme()),
                    status: self.redirect_code,
                    body: self.redirect_body.render(&location),
                    location,
                })
            }
            Err(e) => Outcome::Rejected(e),
        }
    }

    /// Secure cookies and add HSTS on an encrypted forwarded response.
    pub fn post_process(&self, headers: &mut HeaderMap) {
        if self.force_secure_cookies {
            secure_cookies(headers);
        }
        if let Some(policy) = &self.hsts {
            if self.mode != Mode::Strict {
                apply_hsts(headers, policy);
            }
        }
    }
}
