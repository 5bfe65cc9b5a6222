//! Single-rule matching.
//!
//! # Responsibilities
//! - Pick the tested string for a key (host, method, environment, agent, path)
//! - Apply the rule: regex search, predicate call, prefix or exact comparison
//! - Invert literal and pattern results for `except*` keys
//!
//! # Design Decisions
//! - Literal path rules match whole segments: `/account` covers `/account` and
//!   `/account/public`, never `/accountant`
//! - A missing attribute (no user agent, no environment) never raw-matches

use crate::enforcer::rule::{Attribute, ConstraintKey, Polarity, Rule};
use crate::http::request::RequestView;

/// Returns true if `rule`, configured under `key`, matches the request.
pub fn matches(key: ConstraintKey, rule: &Rule, view: &RequestView) -> bool {
    if let Rule::Predicate(predicate) = rule {
        return predicate(view);
    }

    let raw = matches_attribute(key.attribute(), rule, view);
    match key.polarity() {
        Polarity::Only => raw,
        Polarity::Except => !raw,
    }
}

/// Raw (polarity-free) match of a rule against one attribute.
pub(crate) fn matches_attribute(attribute: Attribute, rule: &Rule, view: &RequestView) -> bool {
    let tested = tested_string(attribute, view);
    match rule {
        Rule::Predicate(predicate) => predicate(view),
        Rule::Pattern(re) => tested.is_some_and(|s| re.is_match(s)),
        Rule::Literal(literal) if attribute == Attribute::Path => {
            tested.is_some_and(|s| path_prefix_matches(literal, s))
        }
        Rule::Literal(literal) => tested == Some(literal.as_str()),
    }
}

fn tested_string(attribute: Attribute, view: &RequestView) -> Option<&str> {
    match attribute {
        Attribute::Host => Some(view.host()),
        Attribute::Method => Some(view.method()),
        Attribute::Environment => view.environment(),
        Attribute::Agent => view.user_agent(),
        Attribute::Path => Some(view.path()),
    }
}

/// Segment-aware prefix match.
///
/// An empty prefix matches every path.
fn path_prefix_matches(prefix: &str, path: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => prefix.is_empty() || prefix.ends_with('/') || rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
