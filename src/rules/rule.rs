//! Rule records, option values and rule validation.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Location sentinel meaning "every channel of the guild".
pub const GLOBAL_LOCATION: &str = "global";

/// Location placeholder resolved to the invoking channel when a rule is set.
pub const HERE_LOCATION: &str = "here";

/// Target sentinel meaning "every user".
pub const ALL_TARGETS: &str = "all";

/// Name of the option every rule carries.
pub const CHANCE_OPTION: &str = "chance";

/// Value of `chance` when the user does not give one.
pub const DEFAULT_CHANCE: f64 = 1.0;

/// Errors found when validating stored rules.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("Rule in guild {guild} has an empty name")]
    EmptyName { guild: String },

    #[error("Rule '{rule}' has no filters")]
    NoFilters { rule: String },

    #[error("Rule '{rule}' has no channels")]
    NoLocations { rule: String },

    #[error("Rule '{rule}' has no targets")]
    NoTargets { rule: String },

    #[error("Rule '{rule}' is missing the 'chance' option")]
    MissingChance { rule: String },

    #[error("Duplicate rule name '{rule}' in guild {guild}")]
    DuplicateName { guild: String, rule: String },
}

/// A single option value: numeric when the raw text parses as a finite float.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Number(f64),
    Text(String),
}

impl OptionValue {
    /// Classifies raw user input.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<f64>() {
            Ok(number) if number.is_finite() => Self::Number(number),
            _ => Self::Text(raw.to_owned()),
        }
    }

    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(number) => Some(*number),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(number) => write_number(f, *number),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// Writes a number in shortest form, switching to `1e+21` / `1e-7` style
/// exponents outside `1e-6..1e21`.
fn write_number(f: &mut fmt::Formatter<'_>, number: f64) -> fmt::Result {
    let magnitude = number.abs();

    if magnitude >= 1e21 || (magnitude > 0.0 && magnitude < 1e-6) {
        let formatted = format!("{number:e}");
        match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                write!(f, "{mantissa}e+{exponent}")
            }
            _ => f.write_str(&formatted),
        }
    } else {
        write!(f, "{number}")
    }
}

/// Per-rule options in insertion order.
///
/// A freshly built set always starts with `chance=1`; user-supplied pairs are
/// overlaid on top, so an explicit `chance` keeps the first position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleOptions(IndexMap<String, OptionValue>);

impl Default for RuleOptions {
    fn default() -> Self {
        let mut options = IndexMap::new();
        options.insert(
            CHANCE_OPTION.to_owned(),
            OptionValue::Number(DEFAULT_CHANCE),
        );
        Self(options)
    }
}

impl RuleOptions {
    /// Creates the default option set (`chance=1`).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `key=value` pairs separated by commas over the defaults.
    ///
    /// Empty segments are skipped. A segment without `=` stores an empty
    /// text value; only the text between the first and second `=` is kept.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut options = Self::new();

        for pair in raw.split(',').filter(|pair| !pair.is_empty()) {
            let mut parts = pair.split('=');
            let key = parts.next().unwrap_or_default();
            let value = parts.next().unwrap_or_default();
            options.insert(key, OptionValue::parse(value));
        }

        options
    }

    /// Inserts or replaces an option, keeping the position of an existing key.
    pub fn insert(&mut self, key: impl Into<String>, value: OptionValue) {
        self.0.insert(key.into(), value);
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.0.get(key)
    }

    /// Returns the numeric `chance` option, if present and numeric.
    #[must_use]
    pub fn chance(&self) -> Option<f64> {
        self.get(CHANCE_OPTION).and_then(OptionValue::as_number)
    }

    /// Returns the `text` option rendered as a string.
    #[must_use]
    pub fn text(&self) -> Option<String> {
        self.get("text").map(ToString::to_string)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &OptionValue)> {
        self.0.iter()
    }
}

/// A named binding of filters to channels, targets and options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    /// Identifier, unique within a guild.
    pub rule_name: String,

    /// Filters in application order.
    pub filter_names: Vec<String>,

    /// Channel names, or [`GLOBAL_LOCATION`].
    pub locations: Vec<String>,

    /// User identifiers, or [`ALL_TARGETS`].
    pub targets: Vec<String>,

    pub options: RuleOptions,
}

impl Rule {
    #[must_use]
    pub const fn new(
        rule_name: String,
        filter_names: Vec<String>,
        locations: Vec<String>,
        targets: Vec<String>,
        options: RuleOptions,
    ) -> Self {
        Self {
            rule_name,
            filter_names,
            locations,
            targets,
            options,
        }
    }

    /// Whether the rule uses the named filter.
    #[must_use]
    pub fn has_filter(&self, filter_name: &str) -> bool {
        self.filter_names.iter().any(|name| name == filter_name)
    }

    /// Whether the rule covers every channel.
    #[must_use]
    pub fn is_global(&self) -> bool {
        self.locations.iter().any(|location| location == GLOBAL_LOCATION)
    }

    /// Whether the rule covers every user.
    #[must_use]
    pub fn targets_everyone(&self) -> bool {
        self.targets.iter().any(|target| target == ALL_TARGETS)
    }

    /// Checks the invariants a stored rule must hold.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self, guild: &str) -> Result<(), RuleError> {
        if self.rule_name.is_empty() {
            return Err(RuleError::EmptyName {
                guild: guild.to_owned(),
            });
        }

        let rule = || self.rule_name.clone();

        if self.filter_names.is_empty() {
            return Err(RuleError::NoFilters { rule: rule() });
        }
        if self.locations.is_empty() {
            return Err(RuleError::NoLocations { rule: rule() });
        }
        if self.targets.is_empty() {
            return Err(RuleError::NoTargets { rule: rule() });
        }
        if self.options.get(CHANCE_OPTION).is_none() {
            return Err(RuleError::MissingChance { rule: rule() });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|&s| s.to_owned()).collect()
    }

    #[test]
    fn test_option_value_number() {
        assert_eq!(OptionValue::parse("0.5"), OptionValue::Number(0.5));
        assert_eq!(OptionValue::parse("0"), OptionValue::Number(0.0));
    }

    #[test]
    fn test_option_value_text() {
        assert_eq!(OptionValue::parse("text"), OptionValue::Text("text".to_owned()));
        assert_eq!(OptionValue::parse("NaN"), OptionValue::Text("NaN".to_owned()));
        assert_eq!(OptionValue::parse("inf"), OptionValue::Text("inf".to_owned()));
    }

    #[test]
    fn test_option_value_display() {
        assert_eq!(OptionValue::Number(1.0).to_string(), "1");
        assert_eq!(OptionValue::Number(0.25).to_string(), "0.25");
        assert_eq!(OptionValue::Text("hey".to_owned()).to_string(), "hey");
    }

    #[test]
    fn test_option_value_display_exponents() {
        assert_eq!(OptionValue::Number(1e21).to_string(), "1e+21");
        assert_eq!(OptionValue::Number(1.5e22).to_string(), "1.5e+22");
        assert_eq!(OptionValue::Number(1e-7).to_string(), "1e-7");
        assert_eq!(OptionValue::Number(-2.5e-8).to_string(), "-2.5e-8");
        assert_eq!(OptionValue::Number(1e20).to_string(), "100000000000000000000");
        assert_eq!(OptionValue::Number(0.000_001).to_string(), "0.000001");
        assert_eq!(OptionValue::Number(0.0).to_string(), "0");
    }

    #[test]
    fn test_default_options_only_chance() {
        let options = RuleOptions::new();
        assert_eq!(options.iter().count(), 1);
        assert_eq!(options.chance(), Some(1.0));
    }

    #[test]
    fn test_parse_options_overlay_keeps_chance_first() {
        let options = RuleOptions::parse("mode=loud,chance=0.5");
        let keys: Vec<&String> = options.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, ["chance", "mode"]);
        assert_eq!(options.chance(), Some(0.5));
        assert_eq!(options.get("mode"), Some(&OptionValue::Text("loud".to_owned())));
    }

    #[test]
    fn test_parse_options_edge_segments() {
        let options = RuleOptions::parse("flag,,expr=a=b");
        assert_eq!(options.get("flag"), Some(&OptionValue::Text(String::new())));
        assert_eq!(options.get("expr"), Some(&OptionValue::Text("a".to_owned())));
        assert_eq!(options.iter().count(), 3);
    }

    #[test]
    fn test_options_serialize_untagged() {
        let options = RuleOptions::parse("text=hi");
        let json = serde_json::to_string(&options).unwrap();
        assert_eq!(json, r#"{"chance":1.0,"text":"hi"}"#);

        let back: RuleOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(back, options);
    }

    #[test]
    fn test_rule_sentinels() {
        let rule = Rule::new(
            "r".to_owned(),
            strings(&["uwu"]),
            strings(&["global"]),
            strings(&["all"]),
            RuleOptions::new(),
        );
        assert!(rule.is_global());
        assert!(rule.targets_everyone());
        assert!(rule.has_filter("uwu"));
        assert!(!rule.has_filter("censor"));
    }

    #[test]
    fn test_validate_rule() {
        let mut rule = Rule::new(
            "r".to_owned(),
            strings(&["uwu"]),
            strings(&["general"]),
            strings(&["Person1"]),
            RuleOptions::new(),
        );
        assert!(rule.validate("g").is_ok());

        rule.targets.clear();
        assert!(matches!(rule.validate("g"), Err(RuleError::NoTargets { .. })));

        rule.rule_name.clear();
        assert!(matches!(rule.validate("g"), Err(RuleError::EmptyName { .. })));
    }

    #[test]
    fn test_validate_missing_chance() {
        let options: RuleOptions = serde_json::from_str(r#"{"mode":"x"}"#).unwrap();
        let rule = Rule::new(
            "r".to_owned(),
            strings(&["uwu"]),
            strings(&["general"]),
            strings(&["all"]),
            options,
        );
        assert!(matches!(rule.validate("g"), Err(RuleError::MissingChance { .. })));
    }
}
