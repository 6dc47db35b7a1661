//! Filter rules and their storage.
//!
//! A rule binds named text filters to channels and target users within a
//! guild. Rules are kept per guild by a [`RuleStore`].

mod rule;
mod store;

pub use rule::{
    ALL_TARGETS, CHANCE_OPTION, DEFAULT_CHANCE, GLOBAL_LOCATION, HERE_LOCATION, OptionValue, Rule,
    RuleError, RuleOptions,
};
pub use store::{JsonRuleStore, MemoryRuleStore, RuleStore, StoreError};
