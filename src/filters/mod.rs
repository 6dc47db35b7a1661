//! Text filter engine seam.
//!
//! Filters themselves live with the message pipeline; commands only need to
//! run a filter once to check that a rule using it is usable.

use thiserror::Error;

use crate::chat::ChatMessage;
use crate::rules::RuleOptions;

/// Filter that turns text into message reactions.
pub const REACTIFY: &str = "reactify";

/// Filters known to the default engine.
pub const DEFAULT_FILTERS: [&str; 4] = ["uwu", "censor", "ghetto", REACTIFY];

/// Errors raised when applying a filter. The display text is shown to users.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("Unknown filter: {0}")]
    Unknown(String),

    #[error("reactify requires a \"text\" option.")]
    MissingText,

    #[error("reactify text may only contain letters and digits.")]
    InvalidText,
}

/// Applies named filters to text.
pub trait FilterEngine: Send + Sync {
    /// Applies `filter_name` to `text` with the rule's options.
    ///
    /// # Errors
    ///
    /// Returns an error with a user-facing message if the filter cannot run.
    fn apply_filter(
        &self,
        filter_name: &str,
        text: Option<&str>,
        options: &RuleOptions,
        message: &ChatMessage,
    ) -> Result<String, FilterError>;
}

/// Engine that knows filter names and checks their preconditions.
///
/// Text passes through unchanged.
#[derive(Debug, Clone)]
pub struct KnownFilters {
    names: Vec<String>,
}

impl Default for KnownFilters {
    fn default() -> Self {
        Self::new(DEFAULT_FILTERS.iter().map(|&name| name.to_owned()).collect())
    }
}

impl KnownFilters {
    #[must_use]
    pub const fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    #[must_use]
    pub fn is_known(&self, filter_name: &str) -> bool {
        self.names.iter().any(|name| name == filter_name)
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl FilterEngine for KnownFilters {
    fn apply_filter(
        &self,
        filter_name: &str,
        text: Option<&str>,
        _options: &RuleOptions,
        _message: &ChatMessage,
    ) -> Result<String, FilterError> {
        if !self.is_known(filter_name) {
            return Err(FilterError::Unknown(filter_name.to_owned()));
        }

        let text = text.unwrap_or_default();

        if filter_name == REACTIFY {
            if text.is_empty() {
                return Err(FilterError::MissingText);
            }
            if !text.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == ' ') {
                return Err(FilterError::InvalidText);
            }
        }

        Ok(text.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::chat::ConsoleChannel;

    fn message() -> ChatMessage {
        ChatMessage::new("g", "user", "", Arc::new(ConsoleChannel::new("general")))
    }

    #[test]
    fn test_unknown_filter() {
        let engine = KnownFilters::default();
        let result = engine.apply_filter("nope", Some("hi"), &RuleOptions::new(), &message());
        assert!(matches!(result, Err(FilterError::Unknown(name)) if name == "nope"));
    }

    #[test]
    fn test_reactify_requires_text() {
        let engine = KnownFilters::default();
        let err = engine
            .apply_filter(REACTIFY, None, &RuleOptions::new(), &message())
            .unwrap_err();
        assert_eq!(err.to_string(), "reactify requires a \"text\" option.");
    }

    #[test]
    fn test_reactify_rejects_symbols() {
        let engine = KnownFilters::default();
        let result = engine.apply_filter(REACTIFY, Some("hi!"), &RuleOptions::new(), &message());
        assert!(matches!(result, Err(FilterError::InvalidText)));
    }

    #[test]
    fn test_known_filter_passes_text_through() {
        let engine = KnownFilters::default();
        let output = engine
            .apply_filter(REACTIFY, Some("nice"), &RuleOptions::new(), &message())
            .unwrap();
        assert_eq!(output, "nice");
        assert_eq!(engine.names().len(), DEFAULT_FILTERS.len());
    }
}
