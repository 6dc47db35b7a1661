//! Rule command handler implementation.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::types::{CommandError, RuleAction};
use crate::chat::ChatMessage;
use crate::filters::{FilterEngine, REACTIFY};
use crate::rules::{Rule, RuleStore};

/// Separator between items of a rule section.
const ITEM_SEPARATOR: &str = "\n\t";

/// Handles `rule set|get|delete` for the guild a message was posted in.
pub struct RuleCommand<S, F> {
    /// Shared rule storage.
    store: Arc<RwLock<S>>,

    /// Filter engine used to check `reactify` rules before saving.
    filters: Arc<F>,
}

impl<S: RuleStore, F: FilterEngine> RuleCommand<S, F> {
    /// Creates a new rule command handler.
    #[must_use]
    pub const fn new(store: Arc<RwLock<S>>, filters: Arc<F>) -> Self {
        Self { store, filters }
    }

    /// Parses `args` and runs the subcommand, replying in the message's channel.
    ///
    /// An empty argument list or an unknown subcommand does nothing.
    ///
    /// # Errors
    ///
    /// Returns an error, without replying, when a required argument is
    /// missing or the store fails to persist a change.
    pub async fn execute<A: AsRef<str>>(
        &self,
        message: &ChatMessage,
        args: &[A],
    ) -> Result<(), CommandError> {
        let Some(action) = RuleAction::parse(args, message.channel_name())? else {
            return Ok(());
        };

        debug!("Handling rule command in guild {}: {}", message.guild_id, action);

        match action {
            RuleAction::Set(rule) => self.handle_set(message, rule).await,
            RuleAction::List => self.handle_list(message).await,
            RuleAction::Get(name) => self.handle_get(message, &name).await,
            RuleAction::Delete(name) => self.handle_delete(message, &name).await,
        }
    }

    async fn handle_set(&self, message: &ChatMessage, rule: Rule) -> Result<(), CommandError> {
        if rule.has_filter(REACTIFY) {
            let text = rule.options.text();
            match self
                .filters
                .apply_filter(REACTIFY, text.as_deref(), &rule.options, message)
            {
                Ok(output) => info!("reactify check for rule '{}': {}", rule.rule_name, output),
                Err(e) => {
                    warn!("reactify check failed for rule '{}': {}", rule.rule_name, e);
                    message.reply(&e.to_string()).await;
                    return Ok(());
                }
            }
        }

        let reply = format!("\"{}\" rule made:\n{}", rule.rule_name, format_rule(&rule));
        let rule_name = rule.rule_name.clone();

        self.store.write().await.set_rule(&message.guild_id, rule)?;
        info!("Saved rule '{}' for guild {}", rule_name, message.guild_id);

        message.reply(&reply).await;
        Ok(())
    }

    async fn handle_list(&self, message: &ChatMessage) -> Result<(), CommandError> {
        let names = self.store.read().await.rule_names(&message.guild_id).join(", ");

        let reply = if names.is_empty() {
            "No rules found.".to_owned()
        } else {
            format!("```{names}```")
        };

        message.reply(&reply).await;
        Ok(())
    }

    async fn handle_get(&self, message: &ChatMessage, name: &str) -> Result<(), CommandError> {
        let reply = {
            let store = self.store.read().await;
            store.get_rule(&message.guild_id, name).map_or_else(
                || format!("\"{name}\" rule not found."),
                format_rule,
            )
        };

        message.reply(&reply).await;
        Ok(())
    }

    async fn handle_delete(&self, message: &ChatMessage, name: &str) -> Result<(), CommandError> {
        let removed = self
            .store
            .write()
            .await
            .delete_rule(&message.guild_id, name)?;

        if removed {
            info!("Deleted rule '{}' for guild {}", name, message.guild_id);
        } else {
            debug!("Rule '{}' did not exist in guild {}", name, message.guild_id);
        }

        message.reply(&format!("\"{name}\" rule deleted.")).await;
        Ok(())
    }
}

/// Renders a rule as a code block with name, filters, channels, targets and options.
#[must_use]
pub fn format_rule(rule: &Rule) -> String {
    let options = rule
        .options
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join(ITEM_SEPARATOR);

    format!(
        "```\n\
         Rule name:\n    {}\n\n\
         Filters:\n    {}\n\n\
         Channels:\n    {}\n\n\
         Targets:\n    {}\n\n\
         Options: \n    {}\n\
         ```",
        rule.rule_name,
        rule.filter_names.join(ITEM_SEPARATOR),
        rule.locations.join(ITEM_SEPARATOR),
        rule.targets.join(ITEM_SEPARATOR),
        options,
    )
}
