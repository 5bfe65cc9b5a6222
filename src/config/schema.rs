//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::config::loader::ConfigError;
use crate::config::validation::ValidationError;
use crate::enforcer::{
    ConstraintKey, Enforcer, EnforcerOptions, HstsPolicy, MethodPathRule, RedirectBody, Rule,
};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Plaintext listener.
    pub listener: ListenerConfig,

    /// Optional TLS listener.
    pub tls: Option<TlsConfig>,

    /// Application to forward to. Without it the gateway answers itself.
    pub upstream: Option<UpstreamConfig>,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Deployment environment seen by environment rules.
    /// Falls back to the `APP_ENV`, then `ENV` variables when unset.
    pub environment: Option<String>,

    /// Scheme enforcement rules and redirect behaviour.
    pub enforcer: EnforcerSettings,
}

impl GatewayConfig {
    /// Compile and validate the `[enforcer]` table.
    pub fn build_enforcer(&self) -> Result<Enforcer, ConfigError> {
        let options = self.enforcer.to_options().map_err(ConfigError::Validation)?;
        Enforcer::new(options)
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// TLS listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Bind address (e.g., "0.0.0.0:8443").
    #[serde(default = "default_tls_bind")]
    pub bind_address: String,

    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

fn default_tls_bind() -> String {
    "0.0.0.0:8443".to_string()
}

/// Upstream application.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// Upstream address (e.g., "127.0.0.1:3000").
    pub address: String,
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// A rule as written in the config file: `"/login"` or `{ regex = "\\.xml$" }`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RuleSpec {
    Literal(String),
    Pattern { regex: String },
}

/// One rule or a list of rules.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RuleList {
    One(RuleSpec),
    Many(Vec<RuleSpec>),
}

impl Default for RuleList {
    fn default() -> Self {
        RuleList::Many(Vec::new())
    }
}

impl RuleList {
    fn specs(&self) -> &[RuleSpec] {
        match self {
            RuleList::One(spec) => std::slice::from_ref(spec),
            RuleList::Many(specs) => specs,
        }
    }
}

/// A `{ method = ..., path = ... }` pair.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct MethodPathSpec {
    pub method: RuleSpec,
    pub path: RuleSpec,
}

/// `hsts = true` or `hsts = { expires = 500, subdomains = false }`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum HstsSetting {
    Enabled(bool),
    Policy(HstsSpec),
}

impl Default for HstsSetting {
    fn default() -> Self {
        HstsSetting::Enabled(false)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct HstsSpec {
    pub expires: u64,
    pub subdomains: bool,
    pub preload: bool,
}

impl Default for HstsSpec {
    fn default() -> Self {
        let policy = HstsPolicy::default();
        Self {
            expires: policy.expires,
            subdomains: policy.subdomains,
            preload: policy.preload,
        }
    }
}

/// `redirect_html = false`, a string, or a list of strings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RedirectHtml {
    Enabled(bool),
    Text(String),
    Parts(Vec<String>),
}

impl Default for RedirectHtml {
    fn default() -> Self {
        RedirectHtml::Enabled(true)
    }
}

/// The `[enforcer]` table.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EnforcerSettings {
    pub only: RuleList,
    pub except: RuleList,
    pub only_hosts: RuleList,
    pub except_hosts: RuleList,
    pub only_methods: RuleList,
    pub except_methods: RuleList,
    pub only_method_paths: Vec<MethodPathSpec>,
    pub except_method_paths: Vec<MethodPathSpec>,
    pub only_environments: RuleList,
    pub except_environments: RuleList,
    pub only_agents: RuleList,
    pub except_agents: RuleList,
    pub ignore: RuleList,

    pub strict: bool,
    pub mixed: bool,

    pub redirect_to: Option<String>,
    pub redirect_code: u16,
    pub http_port: Option<u16>,
    pub https_port: Option<u16>,

    pub hsts: HstsSetting,
    pub force_secure_cookies: bool,
    pub redirect_html: RedirectHtml,
}

impl Default for EnforcerSettings {
    fn default() -> Self {
        Self {
            only: RuleList::default(),
            except: RuleList::default(),
            only_hosts: RuleList::default(),
            except_hosts: RuleList::default(),
            only_methods: RuleList::default(),
            except_methods: RuleList::default(),
            only_method_paths: Vec::new(),
            except_method_paths: Vec::new(),
            only_environments: RuleList::default(),
            except_environments: RuleList::default(),
            only_agents: RuleList::default(),
            except_agents: RuleList::default(),
            ignore: RuleList::default(),
            strict: false,
            mixed: false,
            redirect_to: None,
            redirect_code: 301,
            http_port: None,
            https_port: None,
            hsts: HstsSetting::default(),
            force_secure_cookies: true,
            redirect_html: RedirectHtml::default(),
        }
    }
}

impl EnforcerSettings {
    /// Compile patterns and convert into engine options.
    pub fn to_options(&self) -> Result<EnforcerOptions, Vec<ValidationError>> {
        let mut errors = Vec::new();
        let mut rules = |key: ConstraintKey, list: &RuleList| -> Vec<Rule> {
            list.specs()
                .iter()
                .filter_map(|spec| compile(key.name(), spec, &mut errors))
                .collect()
        };

        let mut options = EnforcerOptions {
            only: rules(ConstraintKey::Only, &self.only),
            except: rules(ConstraintKey::Except, &self.except),
            only_hosts: rules(ConstraintKey::OnlyHosts, &self.only_hosts),
            except_hosts: rules(ConstraintKey::ExceptHosts, &self.except_hosts),
            only_methods: rules(ConstraintKey::OnlyMethods, &self.only_methods),
            except_methods: rules(ConstraintKey::ExceptMethods, &self.except_methods),
            only_environments: rules(ConstraintKey::OnlyEnvironments, &self.only_environments),
            except_environments: rules(ConstraintKey::ExceptEnvironments, &self.except_environments),
            only_agents: rules(ConstraintKey::OnlyAgents, &self.only_agents),
            except_agents: rules(ConstraintKey::ExceptAgents, &self.except_agents),
            ignore: rules(ConstraintKey::Ignore, &self.ignore),
            strict: self.strict,
            mixed: self.mixed,
            redirect_to: self.redirect_to.clone(),
            redirect_code: self.redirect_code,
            http_port: self.http_port,
            https_port: self.https_port,
            hsts: match &self.hsts {
                HstsSetting::Enabled(true) => Some(HstsPolicy::default()),
                HstsSetting::Enabled(false) => None,
                HstsSetting::Policy(spec) => Some(HstsPolicy {
                    expires: spec.expires,
                    subdomains: spec.subdomains,
                    preload: spec.preload,
                }),
            },
            force_secure_cookies: self.force_secure_cookies,
            redirect_body: match &self.redirect_html {
                RedirectHtml::Enabled(true) => RedirectBody::Default,
                RedirectHtml::Enabled(false) => RedirectBody::Empty,
                RedirectHtml::Text(text) => RedirectBody::Text(text.clone()),
                RedirectHtml::Parts(parts) => RedirectBody::Parts(parts.clone()),
            },
            ..EnforcerOptions::default()
        };

        options.only_method_paths = compile_pairs("only_method_paths", &self.only_method_paths, &mut errors);
        options.except_method_paths =
            compile_pairs("except_method_paths", &self.except_method_paths, &mut errors);

        if errors.is_empty() {
            Ok(options)
        } else {
            Err(errors)
        }
    }
}

fn compile(key: &str, spec: &RuleSpec, errors: &mut Vec<ValidationError>) -> Option<Rule> {
    match spec {
        RuleSpec::Literal(value) => Some(Rule::literal(value.as_str())),
        RuleSpec::Pattern { regex } => match Rule::pattern(regex) {
            Ok(rule) => Some(rule),
            Err(source) => {
                errors.push(ValidationError::InvalidPattern {
                    key: key.to_string(),
                    source,
                });
                None
            }
        },
    }
}

fn compile_pairs(
    key: &str,
    specs: &[MethodPathSpec],
    errors: &mut Vec<ValidationError>,
) -> Vec<MethodPathRule> {
    specs
        .iter()
        .filter_map(|spec| {
            let method = compile(key, &spec.method, errors);
            let path = compile(key, &spec.path, errors);
            Some(MethodPathRule {
                method: method?,
                path: path?,
            })
        })
        .collect()
}
