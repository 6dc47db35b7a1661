//! Nero Bot - Console Entry Point
//!
//! Runs the Nero command router against a local console "chat": every line
//! typed is treated as a message posted in the current channel.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use dialoguer::Input;
use tokio::sync::RwLock;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use nero_bot::chat::{ChatChannel, ChatMessage, ConsoleChannel};
use nero_bot::commands::{CommandRouter, RuleCommand};
use nero_bot::config::BotSettings;
use nero_bot::filters::KnownFilters;
use nero_bot::rules::{JsonRuleStore, MemoryRuleStore, RuleStore};

/// Console front-end for the Nero chat bot.
#[derive(Parser, Debug)]
#[command(name = "nero_bot")]
#[command(about = "Manage Nero filter rules from a local console chat")]
#[command(version)]
struct Args {
    /// Path to the rules JSON file (defaults to RULES_PATH or rules.json).
    #[arg(short, long)]
    rules: Option<PathBuf>,

    /// Keep rules in memory only.
    #[arg(long)]
    memory: bool,

    /// Path to the .env file for environment variables.
    #[arg(long, default_value = ".env")]
    env_file: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Guild identifier messages are posted in.
    #[arg(short, long)]
    guild: Option<String>,

    /// Channel to start in.
    #[arg(short, long)]
    channel: Option<String>,

    /// Author name attached to messages.
    #[arg(short, long, default_value = "operator")]
    author: String,

    /// Generate an example rules file and exit.
    #[arg(long)]
    generate_example: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load environment variables before reading settings
    let env_loaded = dotenvy::from_filename(&args.env_file);

    let mut settings = BotSettings::from_env_with_defaults();
    if let Some(path) = &args.rules {
        settings.rules_path.clone_from(path);
    }
    if let Some(guild) = &args.guild {
        settings.guild_id.clone_from(guild);
    }
    if let Some(channel) = &args.channel {
        settings.channel.clone_from(channel);
    }
    if let Some(level) = &args.log_level {
        settings.log_level.clone_from(level);
    }

    init_logging(&settings.log_level);

    if let Err(e) = env_loaded {
        debug!("Could not load .env file ({}): {}", args.env_file, e);
    }

    if args.generate_example {
        return generate_example();
    }

    settings.validate().context("Invalid bot settings")?;

    let filters = Arc::new(KnownFilters::default());

    if args.memory {
        info!("Keeping rules in memory only");
        run(&settings, &args.author, MemoryRuleStore::new(), filters).await
    } else {
        let store = JsonRuleStore::open(&settings.rules_path).with_context(|| {
            format!("Failed to open rules file {}", settings.rules_path.display())
        })?;
        info!(
            "Loaded {} rules from {}",
            store.rules().len(),
            store.path().display()
        );
        run(&settings, &args.author, store, filters).await
    }
}

/// Reads console lines and routes them as chat messages until EOF or `/quit`.
async fn run<S: RuleStore>(
    settings: &BotSettings,
    author: &str,
    store: S,
    filters: Arc<KnownFilters>,
) -> Result<()> {
    let rule = RuleCommand::new(Arc::new(RwLock::new(store)), filters);
    let router = CommandRouter::new(settings.command_prefix.clone(), rule);
    let mut channel = Arc::new(ConsoleChannel::new(settings.channel.clone()));

    info!("Guild: {}", settings.guild_id);
    info!("Command prefix: {}", router.prefix());
    info!(
        "Type '{} help' for commands, '/join <channel>' to switch channel, '/quit' to exit.",
        router.prefix()
    );

    loop {
        let line = match Input::<String>::new()
            .with_prompt(format!("{author} #{}", channel.name()))
            .allow_empty(true)
            .interact_text()
        {
            Ok(line) => line,
            Err(e) => {
                debug!("Input closed: {}", e);
                break;
            }
        };

        match line.trim() {
            "" => continue,
            "/quit" | "/exit" => break,
            cmd if cmd.starts_with("/join") => {
                match cmd.split_whitespace().nth(1) {
                    Some(name) => {
                        channel = Arc::new(ConsoleChannel::new(name));
                        info!("Switched to #{}", name);
                    }
                    None => println!("Usage: /join <channel>"),
                }
                continue;
            }
            _ => {}
        }

        let message = ChatMessage::new(
            settings.guild_id.clone(),
            author,
            line,
            channel.clone(),
        );

        if router.try_handle(&message).await.is_none() {
            debug!("Not a command: {}", message.content);
        }
    }

    info!("Shutting down...");
    Ok(())
}

/// Initializes the logging subsystem.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Generates an example rules file.
fn generate_example() -> Result<()> {
    let example = MemoryRuleStore::example();
    example.save_to_file("rules.example.json")?;

    println!("✓ Example rules written to: rules.example.json");
    println!("\nTo use this bot:");
    println!("1. Copy rules.example.json to rules.json (or start with no file)");
    println!("2. Optionally create a .env file with COMMAND_PREFIX, NERO_GUILD_ID, NERO_CHANNEL");
    println!("3. Run: nero_bot");

    Ok(())
}
