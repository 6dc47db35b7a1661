//! Chat platform abstractions.
//!
//! Commands only see a [`ChatMessage`] and reply through its [`ChatChannel`],
//! so any platform (or the local console) can drive them.

mod console;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

pub use console::ConsoleChannel;

/// Errors raised while delivering a reply.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Channel is closed")]
    Closed,

    #[error("Failed to write message: {0}")]
    Io(#[from] std::io::Error),
}

/// A channel the bot can post text into.
#[async_trait]
pub trait ChatChannel: Send + Sync {
    /// Channel name as users refer to it.
    fn name(&self) -> &str;

    /// Sends a text message to the channel.
    async fn send(&self, text: &str) -> Result<(), ChatError>;
}

/// An incoming chat message.
#[derive(Clone)]
pub struct ChatMessage {
    /// Guild (server) the message was posted in.
    pub guild_id: String,

    /// Author identifier.
    pub author: String,

    /// Raw message text.
    pub content: String,

    /// Channel the message was posted in; replies go here.
    pub channel: Arc<dyn ChatChannel>,
}

impl ChatMessage {
    #[must_use]
    pub fn new(
        guild_id: impl Into<String>,
        author: impl Into<String>,
        content: impl Into<String>,
        channel: Arc<dyn ChatChannel>,
    ) -> Self {
        Self {
            guild_id: guild_id.into(),
            author: author.into(),
            content: content.into(),
            channel,
        }
    }

    /// Name of the channel the message was posted in.
    #[must_use]
    pub fn channel_name(&self) -> &str {
        self.channel.name()
    }

    /// Replies in the message's channel. Delivery failures are only logged.
    pub async fn reply(&self, text: &str) {
        if let Err(e) = self.channel.send(text).await {
            warn!("Failed to send reply to #{}: {}", self.channel_name(), e);
        }
    }
}

impl fmt::Debug for ChatMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatMessage")
            .field("guild_id", &self.guild_id)
            .field("author", &self.author)
            .field("content", &self.content)
            .field("channel", &self.channel_name())
            .finish()
    }
}
