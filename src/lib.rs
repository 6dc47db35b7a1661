//! Nero Bot Library
//!
//! Filter-rule management for the Nero chat bot.
//!
//! This crate provides:
//! - The `rule` command (`set`, `get`, `delete`) and its reply formatting
//! - Per-guild rule storage, in memory or in a JSON file
//! - Seams for the chat platform and the filter engine
//! - Prefix routing of chat messages to commands

pub mod chat;
pub mod commands;
pub mod config;
pub mod filters;
pub mod rules;
