//! Command handling module.
//!
//! Routes prefixed chat messages (`!nero rule ...`) to the rule command,
//! which manages the guild's filter rules.

mod handler;
mod router;
mod types;

pub use handler::{RuleCommand, format_rule};
pub use router::{CommandRouter, Invocation};
pub use types::{CommandError, RULE_EXAMPLES, RULE_USAGE, RuleAction};
