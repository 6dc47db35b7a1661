//! Console channel used by the local front-end.

use std::io::Write;

use async_trait::async_trait;

use super::{ChatChannel, ChatError};

/// Channel that prints replies to stdout.
#[derive(Debug, Clone)]
pub struct ConsoleChannel {
    name: String,
}

impl ConsoleChannel {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl ChatChannel for ConsoleChannel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(&self, text: &str) -> Result<(), ChatError> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "[#{}] {}", self.name, text)?;
        stdout.flush()?;
        Ok(())
    }
}
