//! Application settings.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{DEFAULT_CHANNEL, DEFAULT_COMMAND_PREFIX, DEFAULT_GUILD_ID, DEFAULT_RULES_PATH};

/// Bot-specific settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotSettings {
    /// Path to the rules JSON file.
    #[serde(default = "default_rules_path")]
    pub rules_path: PathBuf,

    /// Command prefix for bot commands.
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,

    /// Guild the console front-end posts into.
    #[serde(default = "default_guild_id")]
    pub guild_id: String,

    /// Channel the console front-end starts in.
    #[serde(default = "default_channel")]
    pub channel: String,

    /// Log level for the application.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_rules_path() -> PathBuf {
    PathBuf::from(DEFAULT_RULES_PATH)
}

fn default_command_prefix() -> String {
    DEFAULT_COMMAND_PREFIX.to_owned()
}

fn default_guild_id() -> String {
    DEFAULT_GUILD_ID.to_owned()
}

fn default_channel() -> String {
    DEFAULT_CHANNEL.to_owned()
}

fn default_log_level() -> String {
    "info".to_owned()
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            rules_path: default_rules_path(),
            command_prefix: default_command_prefix(),
            guild_id: default_guild_id(),
            channel: default_channel(),
            log_level: default_log_level(),
        }
    }
}

impl BotSettings {
    /// Creates bot settings from environment variables with defaults.
    #[must_use]
    pub fn from_env_with_defaults() -> Self {
        Self {
            rules_path: std::env::var("RULES_PATH")
                .map_or_else(|_| default_rules_path(), PathBuf::from),
            command_prefix: std::env::var("COMMAND_PREFIX")
                .unwrap_or_else(|_| default_command_prefix()),
            guild_id: std::env::var("NERO_GUILD_ID").unwrap_or_else(|_| default_guild_id()),
            channel: std::env::var("NERO_CHANNEL").unwrap_or_else(|_| default_channel()),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| default_log_level()),
        }
    }

    /// Checks that the settings can drive the bot.
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.command_prefix.is_empty() {
            return Err(ConfigError::EmptyValue("COMMAND_PREFIX"));
        }
        if self.command_prefix.contains(char::is_whitespace) {
            return Err(ConfigError::PrefixWhitespace(self.command_prefix.clone()));
        }
        if self.guild_id.is_empty() {
            return Err(ConfigError::EmptyValue("NERO_GUILD_ID"));
        }
        if self.channel.is_empty() {
            return Err(ConfigError::EmptyValue("NERO_CHANNEL"));
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Setting {0} must not be empty")]
    EmptyValue(&'static str),

    #[error("Command prefix '{0}' must not contain whitespace")]
    PrefixWhitespace(String),
}
