//! Prefix-based command routing.

use tracing::{debug, warn};

use super::handler::RuleCommand;
use super::types::{CommandError, RULE_EXAMPLES, RULE_USAGE};
use crate::chat::ChatMessage;
use crate::filters::FilterEngine;
use crate::rules::RuleStore;

/// A command invocation split out of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Lowercased command name (`rule`, `help`).
    pub command: String,

    /// Remaining whitespace-separated tokens.
    pub args: Vec<String>,
}

impl Invocation {
    /// Parses `<prefix> <command> [args...]` from message text.
    ///
    /// Returns `None` if the message does not start with the prefix or names
    /// no command.
    #[must_use]
    pub fn parse(text: &str, prefix: &str) -> Option<Self> {
        let rest = text.trim().strip_prefix(prefix)?;

        // "!neroish" is not "!nero"
        if rest.chars().next().is_some_and(|ch| !ch.is_whitespace()) {
            return None;
        }

        let mut tokens = rest.split_whitespace();
        let command = tokens.next()?.to_lowercase();
        let args = tokens.map(str::to_owned).collect();

        Some(Self { command, args })
    }
}

/// Routes prefixed messages to the bot's commands.
pub struct CommandRouter<S, F> {
    /// Command prefix (e.g. "`!nero`").
    prefix: String,

    rule: RuleCommand<S, F>,
}

impl<S: RuleStore, F: FilterEngine> CommandRouter<S, F> {
    #[must_use]
    pub const fn new(prefix: String, rule: RuleCommand<S, F>) -> Self {
        Self { prefix, rule }
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Tries to handle a message as a command.
    ///
    /// Returns `None` if the message is not a known command, otherwise the
    /// outcome of the command. Failures are logged, never sent to the chat.
    pub async fn try_handle(&self, message: &ChatMessage) -> Option<Result<(), CommandError>> {
        let invocation = Invocation::parse(&message.content, &self.prefix)?;

        debug!(
            "Handling command from {} in #{}: {} {:?}",
            message.author,
            message.channel_name(),
            invocation.command,
            invocation.args
        );

        let result = match invocation.command.as_str() {
            "rule" => self.rule.execute(message, invocation.args.as_slice()).await,
            "help" => {
                message.reply(&self.help_text()).await;
                Ok(())
            }
            _ => return None,
        };

        if let Err(e) = &result {
            warn!("Command '{}' failed: {}", invocation.command, e);
        }

        Some(result)
    }

    fn help_text(&self) -> String {
        let mut lines = vec![
            format!("Nero commands (prefix: {})", self.prefix),
            String::new(),
        ];

        lines.extend(RULE_USAGE.lines().map(|line| {
            if line.starts_with("rule ") {
                format!("{} {line}", self.prefix)
            } else {
                line.to_owned()
            }
        }));
        lines.push(String::new());
        lines.push("Examples:".to_owned());
        lines.extend(RULE_EXAMPLES.iter().map(|example| format!("  {} {example}", self.prefix)));

        lines.join("\n")
    }
}
