//! Rule set combination.
//!
//! # Responsibilities
//! - Combine rules within a rule set (OR for `only*`, AND for `except*`)
//! - Combine the positive and negative sets of one family (AND)
//! - Combine families into the enforcement decision (AND)
//! - Evaluate the `ignore` family separately
//!
//! # Design Decisions
//! - Empty rule sets are dropped at construction; absent families are `true`
//! - Paired method+path rules are OR-ed with the discrete method/path result
//!   before the AND with hosts, environments and agents

use crate::enforcer::matcher::{matches, matches_attribute};
use crate::enforcer::rule::{Attribute, ConstraintKey, MethodPathRule, Polarity, Rule};
use crate::http::request::RequestView;

/// Ordered rules sharing one constraint key.
#[derive(Debug, Clone)]
pub struct RuleSet {
    key: ConstraintKey,
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(key: ConstraintKey, rules: Vec<Rule>) -> Self {
        Self { key, rules }
    }

    /// Any rule for `only*` keys, every rule for `except*` keys.
    pub fn evaluate(&self, view: &RequestView) -> bool {
        match self.key.polarity() {
            Polarity::Only => self.rules.iter().any(|rule| matches(self.key, rule, view)),
            Polarity::Except => self.rules.iter().all(|rule| matches(self.key, rule, view)),
        }
    }
}

/// Method+path pairs under one polarity.
#[derive(Debug, Clone)]
pub struct PairedRuleSet {
    polarity: Polarity,
    pairs: Vec<MethodPathRule>,
}

impl PairedRuleSet {
    pub fn new(polarity: Polarity, pairs: Vec<MethodPathRule>) -> Self {
        Self { polarity, pairs }
    }

    pub fn evaluate(&self, view: &RequestView) -> bool {
        match self.polarity {
            Polarity::Only => self.pairs.iter().any(|pair| pair_matches(pair, view)),
            Polarity::Except => self.pairs.iter().all(|pair| !pair_matches(pair, view)),
        }
    }
}

fn pair_matches(pair: &MethodPathRule, view: &RequestView) -> bool {
    matches_attribute(Attribute::Method, &pair.method, view)
        && matches_attribute(Attribute::Path, &pair.path, view)
}

/// Positive and negative rule sets of one attribute family.
#[derive(Debug, Clone, Default)]
struct Family {
    sets: Vec<RuleSet>,
}

impl Family {
    fn is_configured(&self) -> bool {
        !self.sets.is_empty()
    }

    fn evaluate(&self, view: &RequestView) -> bool {
        self.sets.iter().all(|set| set.evaluate(view))
    }
}

/// All configured constraints of one enforcer.
#[derive(Debug, Clone, Default)]
pub struct ConstraintSet {
    hosts: Family,
    paths: Family,
    methods: Family,
    environments: Family,
    agents: Family,
    method_paths: Vec<PairedRuleSet>,
    ignore: Vec<Rule>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the rules configured under `key`. Empty rule lists are skipped.
    pub fn with_rules(mut self, key: ConstraintKey, rules: Vec<Rule>) -> Self {
        if rules.is_empty() {
            return self;
        }
        if key == ConstraintKey::Ignore {
            self.ignore.extend(rules);
            return self;
        }
        let family = match key.attribute() {
            Attribute::Host => &mut self.hosts,
            Attribute::Path => &mut self.paths,
            Attribute::Method => &mut self.methods,
            Attribute::Environment => &mut self.environments,
            Attribute::Agent => &mut self.agents,
        };
        family.sets.push(RuleSet::new(key, rules));
        self
    }

    /// Add method+path pairs. Empty pair lists are skipped.
    pub fn with_method_paths(mut self, polarity: Polarity, pairs: Vec<MethodPathRule>) -> Self {
        if !pairs.is_empty() {
            self.method_paths.push(PairedRuleSet::new(polarity, pairs));
        }
        self
    }

    /// True when no enforcement family is configured (`ignore` aside).
    pub fn is_unconstrained(&self) -> bool {
        !self.hosts.is_configured()
            && !self.paths.is_configured()
            && !self.methods.is_configured()
            && !self.environments.is_configured()
            && !self.agents.is_configured()
            && self.method_paths.is_empty()
    }

    /// Whether the encrypted scheme is required for this request.
    pub fn enforcement_active(&self, view: &RequestView) -> bool {
        if self.is_unconstrained() {
            return true;
        }

        let discrete = self.methods.evaluate(view) && self.paths.evaluate(view);
        let route = if self.method_paths.is_empty() {
            discrete
        } else {
            let paired = self.method_paths.iter().all(|set| set.evaluate(view));
            if self.methods.is_configured() || self.paths.is_configured() {
                paired || discrete
            } else {
                paired
            }
        };

        route
            && self.hosts.evaluate(view)
            && self.environments.evaluate(view)
            && self.agents.evaluate(view)
    }

    /// True if any `ignore` rule matches; the request then bypasses enforcement.
    pub fn is_ignored(&self, view: &RequestView) -> bool {
        self.ignore
            .iter()
            .any(|rule| matches(ConstraintKey::Ignore, rule, view))
    }
}
