//! Rule representation.
//!
//! # Responsibilities
//! - Represent a single rule as a closed variant (literal, pattern, predicate)
//! - Name the constraint families and their polarity
//! - Pair a method rule with a path rule for the combined family
//!
//! # Design Decisions
//! - Patterns are compiled once when the rule is built, never per request
//! - Predicates own their polarity; the matcher never inverts them

use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::http::request::RequestView;

/// A user-supplied rule evaluated against the whole request view.
pub type Predicate = Arc<dyn Fn(&RequestView) -> bool + Send + Sync>;

/// A single constraint rule.
#[derive(Clone)]
pub enum Rule {
    /// Prefix match on path keys, exact equality elsewhere.
    Literal(String),
    /// Regex search anywhere in the tested string.
    Pattern(Regex),
    /// Arbitrary check over the request view.
    Predicate(Predicate),
}

impl Rule {
    pub fn literal(value: impl Into<String>) -> Self {
        Rule::Literal(value.into())
    }

    /// Compile a pattern rule.
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Rule::Pattern)
    }

    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&RequestView) -> bool + Send + Sync + 'static,
    {
        Rule::Predicate(Arc::new(f))
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Literal(s) => f.debug_tuple("Literal").field(s).finish(),
            Rule::Pattern(re) => f.debug_tuple("Pattern").field(&re.as_str()).finish(),
            Rule::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl From<&str> for Rule {
    fn from(value: &str) -> Self {
        Rule::literal(value)
    }
}

impl From<String> for Rule {
    fn from(value: String) -> Self {
        Rule::Literal(value)
    }
}

impl From<Regex> for Rule {
    fn from(value: Regex) -> Self {
        Rule::Pattern(value)
    }
}

/// The request attribute a rule is tested against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    Host,
    Path,
    Method,
    Environment,
    Agent,
}

/// Whether a rule set restricts to matches or excludes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Only,
    Except,
}

/// Every key a rule set can be configured under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKey {
    Only,
    Except,
    OnlyHosts,
    ExceptHosts,
    OnlyMethods,
    ExceptMethods,
    OnlyEnvironments,
    ExceptEnvironments,
    OnlyAgents,
    ExceptAgents,
    Ignore,
}

impl ConstraintKey {
    pub fn attribute(self) -> Attribute {
        match self {
            ConstraintKey::OnlyHosts | ConstraintKey::ExceptHosts => Attribute::Host,
            ConstraintKey::OnlyMethods | ConstraintKey::ExceptMethods => Attribute::Method,
            ConstraintKey::OnlyEnvironments | ConstraintKey::ExceptEnvironments => {
                Attribute::Environment
            }
            ConstraintKey::OnlyAgents | ConstraintKey::ExceptAgents => Attribute::Agent,
            ConstraintKey::Only | ConstraintKey::Except | ConstraintKey::Ignore => Attribute::Path,
        }
    }

    pub fn polarity(self) -> Polarity {
        match self {
            ConstraintKey::Except
            | ConstraintKey::ExceptHosts
            | ConstraintKey::ExceptMethods
            | ConstraintKey::ExceptEnvironments
            | ConstraintKey::ExceptAgents => Polarity::Except,
            _ => Polarity::Only,
        }
    }

    /// Configuration name of the key.
    pub fn name(self) -> &'static str {
        match self {
            ConstraintKey::Only => "only",
            ConstraintKey::Except => "except",
            ConstraintKey::OnlyHosts => "only_hosts",
            ConstraintKey::ExceptHosts => "except_hosts",
            ConstraintKey::OnlyMethods => "only_methods",
            ConstraintKey::ExceptMethods => "except_methods",
            ConstraintKey::OnlyEnvironments => "only_environments",
            ConstraintKey::ExceptEnvironments => "except_environments",
            ConstraintKey::OnlyAgents => "only_agents",
            ConstraintKey::ExceptAgents => "except_agents",
            ConstraintKey::Ignore => "ignore",
        }
    }
}

impl fmt::Display for ConstraintKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A method rule and a path rule that must both match.
#[derive(Debug, Clone)]
pub struct MethodPathRule {
    pub method: Rule,
    pub path: Rule,
}

impl MethodPathRule {
    pub fn new(method: impl Into<Rule>, path: impl Into<Rule>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
        }
    }
}
