//! Rule command arguments and errors.

use std::fmt;

use thiserror::Error;

use crate::rules::{HERE_LOCATION, Rule, RuleOptions, StoreError};

/// Usage text shown by `help`.
pub const RULE_USAGE: &str = "\
rule set <RULE NAME> <FILTER(S)> <CHANNEL(S)> <TARGET(S)> [OPTIONS]
    Define which filters apply in which channels to which users.
    An existing rule with the same name is replaced.
    Separate multiple filters, channels, targets and options with ','.
    \"global\" as a channel applies the rule to every channel.
    \"here\" as a channel means the current channel.
    \"all\" as a target applies the rule to everybody.
    Options use the form NAME=VALUE; chance is the probability the rule applies (default 1).

rule get <RULE NAME>|*
    Show a rule. '*' lists every rule name.

rule delete <RULE NAME>
    Delete a rule.";

/// Example invocations shown by `help`.
pub const RULE_EXAMPLES: &[&str] = &[
    "rule set global-uwu uwu global all",
    "rule set chance-of-hell uwu,censor,ghetto general,here,memes Person1,Person2 chance=0.5",
    "rule get *",
    "rule get global-uwu",
    "rule delete global-uwu",
];

/// Argument that lists every rule instead of naming one.
pub const ALL_RULES: &str = "*";

/// Errors that abort a command invocation without a reply.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Missing required argument <{name}> at position {position}")]
    MissingArgument { position: usize, name: &'static str },

    #[error("Rule store error: {0}")]
    Store(#[from] StoreError),
}

/// A parsed `rule` subcommand.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleAction {
    /// Create or replace a rule.
    Set(Rule),

    /// List every rule name of the guild.
    List,

    /// Show one rule.
    Get(String),

    /// Delete one rule.
    Delete(String),
}

impl RuleAction {
    /// Parses the tokens following `rule`; `args[0]` is the subcommand.
    ///
    /// Returns `Ok(None)` for an empty argument list or an unknown subcommand.
    /// `here` in the channel list is replaced by `channel_name`.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::MissingArgument`] when a required argument is absent.
    pub fn parse<A: AsRef<str>>(
        args: &[A],
        channel_name: &str,
    ) -> Result<Option<Self>, CommandError> {
        let Some(subcommand) = args.first() else {
            return Ok(None);
        };

        let action = match subcommand.as_ref() {
            "set" => Self::parse_set(args, channel_name)?,
            "get" => match required(args, 1, "rule name")? {
                ALL_RULES => Self::List,
                name => Self::Get(name.to_owned()),
            },
            "delete" => Self::Delete(required(args, 1, "rule name")?.to_owned()),
            _ => return Ok(None),
        };

        Ok(Some(action))
    }

    /// Parses `set <name> <filters> <channels> <targets> [options]`.
    fn parse_set<A: AsRef<str>>(args: &[A], channel_name: &str) -> Result<Self, CommandError> {
        let rule_name = required(args, 1, "rule name")?.to_owned();
        let filter_names = split_list(required(args, 2, "filters")?);
        let locations = split_list(required(args, 3, "channels")?)
            .into_iter()
            .map(|location| {
                if location == HERE_LOCATION {
                    channel_name.to_owned()
                } else {
                    location
                }
            })
            .collect();
        let targets = split_list(required(args, 4, "targets")?);
        let options = args
            .get(5)
            .map_or_else(RuleOptions::new, |raw| RuleOptions::parse(raw.as_ref()));

        Ok(Self::Set(Rule::new(
            rule_name,
            filter_names,
            locations,
            targets,
            options,
        )))
    }
}

impl fmt::Display for RuleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Set(rule) => write!(f, "set {}", rule.rule_name),
            Self::List => write!(f, "get {ALL_RULES}"),
            Self::Get(name) => write!(f, "get {name}"),
            Self::Delete(name) => write!(f, "delete {name}"),
        }
    }
}

/// Returns `args[position]` or a missing-argument error.
fn required<'a, A: AsRef<str>>(
    args: &'a [A],
    position: usize,
    name: &'static str,
) -> Result<&'a str, CommandError> {
    args.get(position)
        .map(AsRef::as_ref)
        .ok_or(CommandError::MissingArgument { position, name })
}

/// Splits a comma-separated list, keeping empty items.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',').map(str::to_owned).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::OptionValue;

    fn parse(args: &[&str]) -> Result<Option<RuleAction>, CommandError> {
        RuleAction::parse(args, "memes")
    }

    fn parse_rule(args: &[&str]) -> Rule {
        match parse(args) {
            Ok(Some(RuleAction::Set(rule))) => rule,
            other => panic!("expected set, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse(&[]).unwrap().is_none());
    }

    #[test]
    fn test_parse_unknown_subcommand() {
        assert!(parse(&["list"]).unwrap().is_none());
        assert!(parse(&["SET", "a", "uwu", "here", "all"]).unwrap().is_none());
    }

    #[test]
    fn test_parse_set_minimal() {
        let rule = parse_rule(&["set", "global-uwu", "uwu", "global", "all"]);
        assert_eq!(rule.rule_name, "global-uwu");
        assert_eq!(rule.filter_names, ["uwu"]);
        assert_eq!(rule.locations, ["global"]);
        assert_eq!(rule.targets, ["all"]);
        assert_eq!(rule.options, RuleOptions::new());
    }

    #[test]
    fn test_parse_set_resolves_here() {
        let rule = parse_rule(&["set", "r", "uwu,censor", "general,here", "A,B", "chance=0.5"]);
        assert_eq!(rule.filter_names, ["uwu", "censor"]);
        assert_eq!(rule.locations, ["general", "memes"]);
        assert_eq!(rule.targets, ["A", "B"]);
        assert_eq!(rule.options.chance(), Some(0.5));
    }

    #[test]
    fn test_parse_set_text_option() {
        let rule = parse_rule(&["set", "r", "uwu", "here", "all", "mode=text"]);
        assert_eq!(rule.options.get("mode"), Some(&OptionValue::Text("text".to_owned())));
        assert_eq!(rule.options.chance(), Some(1.0));
    }

    #[test]
    fn test_parse_set_missing_argument() {
        let err = parse(&["set", "r", "uwu", "here"]).unwrap_err();
        assert!(matches!(
            err,
            CommandError::MissingArgument { position: 4, name: "targets" }
        ));

        assert!(matches!(
            parse(&["set", "r"]),
            Err(CommandError::MissingArgument { position: 2, .. })
        ));
    }

    #[test]
    fn test_parse_get_and_delete() {
        assert_eq!(parse(&["get", "*"]).unwrap(), Some(RuleAction::List));
        assert_eq!(
            parse(&["get", "r"]).unwrap(),
            Some(RuleAction::Get("r".to_owned()))
        );
        assert_eq!(
            parse(&["delete", "r"]).unwrap(),
            Some(RuleAction::Delete("r".to_owned()))
        );
        assert!(parse(&["delete"]).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(RuleAction::List.to_string(), "get *");
        assert_eq!(RuleAction::Delete("r".to_owned()).to_string(), "delete r");
    }
}
