//! Configuration module for the bot.
//!
//! Settings come from environment variables (optionally loaded from a `.env`
//! file) with defaults for everything.

mod settings;

pub use settings::{BotSettings, ConfigError};

/// Default command prefix.
pub const DEFAULT_COMMAND_PREFIX: &str = "!nero";

/// Default rules file.
pub const DEFAULT_RULES_PATH: &str = "rules.json";

/// Guild used by the console front-end when none is configured.
pub const DEFAULT_GUILD_ID: &str = "console";

/// Channel the console front-end starts in when none is configured.
pub const DEFAULT_CHANNEL: &str = "general";
