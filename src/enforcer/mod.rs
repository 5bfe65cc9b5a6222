//! Transport-scheme enforcement.
//!
//! # Data Flow
//! ```text
//! Request → RequestView → ignore? ──yes──→ forward untouched
//!                            │no
//!                            ▼
//!                  ConstraintSet (only/except/hosts/methods/envs/agents)
//!                            │
//!                            ▼
//!                  decide (mode, canonical host) → Decision
//!                            │
//!              ┌─────────────┴─────────────┐
//!              ▼                           ▼
//!     redirect (hook, body)        forward → post_process
//!                                  (secure cookies, HSTS)
//! ```

pub mod engine;
pub mod evaluator;
pub mod headers;
pub mod matcher;
pub mod options;
pub mod policy;
pub mod rewrite;
pub mod rule;

pub use engine::{Enforcer, Outcome, Redirect};
pub use evaluator::ConstraintSet;
pub use headers::{apply_hsts, secure_cookies, HstsPolicy};
pub use options::{EnforcerOptions, RedirectBody, RedirectHook};
pub use policy::{decide, scheme_required, Decision, Mode, Scheme};
pub use rewrite::{build_redirect_location, Ports, RedirectError};
pub use rule::{ConstraintKey, MethodPathRule, Polarity, Predicate, Rule};
