//! Rule persistence, scoped by guild.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use super::rule::{Rule, RuleError, RuleOptions};

/// Errors raised while reading or writing a rules file.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to access rules file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse rules file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Capability to read and modify the rules of a guild.
pub trait RuleStore: Send + Sync {
    /// Stores `rule`, fully replacing any rule of the same name in the guild.
    ///
    /// # Errors
    ///
    /// Returns an error if the change could not be persisted.
    fn set_rule(&mut self, guild_id: &str, rule: Rule) -> Result<(), StoreError>;

    /// Rule names of the guild, in creation order.
    fn rule_names(&self, guild_id: &str) -> Vec<String>;

    /// Looks a rule up by exact name.
    fn get_rule(&self, guild_id: &str, rule_name: &str) -> Option<&Rule>;

    /// Removes a rule by name. Returns whether a rule was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the change could not be persisted.
    fn delete_rule(&mut self, guild_id: &str, rule_name: &str) -> Result<bool, StoreError>;
}

/// In-memory rule store. Also the on-disk shape of a rules file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryRuleStore {
    /// Rules per guild identifier.
    #[serde(default)]
    pub rules: BTreeMap<String, Vec<Rule>>,
}

impl MemoryRuleStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads rules from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let content = std::fs::read_to_string(path)?;
        let store: Self = serde_json::from_str(&content)?;
        Ok(store)
    }

    /// Saves rules to a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validates every rule, returning one result per rule in file order.
    #[must_use]
    pub fn validate_all(&self) -> Vec<(&str, &Rule, Result<(), RuleError>)> {
        let mut results = Vec::new();

        for (guild, rules) in &self.rules {
            let mut seen = HashSet::new();

            for rule in rules {
                let result = if seen.insert(rule.rule_name.as_str()) {
                    rule.validate(guild)
                } else {
                    Err(RuleError::DuplicateName {
                        guild: guild.clone(),
                        rule: rule.rule_name.clone(),
                    })
                };
                results.push((guild.as_str(), rule, result));
            }
        }

        results
    }

    /// Total number of rules across guilds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Creates an example store for users to reference.
    #[must_use]
    pub fn example() -> Self {
        fn strings(items: &[&str]) -> Vec<String> {
            items.iter().map(|&s| s.to_owned()).collect()
        }

        let mut store = Self::new();
        store.insert(
            "123456789012345678",
            Rule::new(
                "global-uwu".to_owned(),
                strings(&["uwu"]),
                strings(&["global"]),
                strings(&["all"]),
                RuleOptions::new(),
            ),
        );
        store.insert(
            "123456789012345678",
            Rule::new(
                "chance-of-hell".to_owned(),
                strings(&["uwu", "censor", "ghetto"]),
                strings(&["general", "memes"]),
                strings(&["Person1", "Person2"]),
                RuleOptions::parse("chance=0.5"),
            ),
        );
        store
    }

    /// Upserts a rule, keeping the position of a replaced rule.
    fn insert(&mut self, guild_id: &str, rule: Rule) {
        let rules = self.rules.entry(guild_id.to_owned()).or_default();

        match rules.iter_mut().find(|r| r.rule_name == rule.rule_name) {
            Some(existing) => *existing = rule,
            None => rules.push(rule),
        }
    }

    fn remove(&mut self, guild_id: &str, rule_name: &str) -> bool {
        let Some(rules) = self.rules.get_mut(guild_id) else {
            return false;
        };

        let before = rules.len();
        rules.retain(|r| r.rule_name != rule_name);
        let removed = rules.len() != before;

        if rules.is_empty() {
            self.rules.remove(guild_id);
        }

        removed
    }
}

impl RuleStore for MemoryRuleStore {
    fn set_rule(&mut self, guild_id: &str, rule: Rule) -> Result<(), StoreError> {
        self.insert(guild_id, rule);
        Ok(())
    }

    fn rule_names(&self, guild_id: &str) -> Vec<String> {
        self.rules
            .get(guild_id)
            .map(|rules| rules.iter().map(|r| r.rule_name.clone()).collect())
            .unwrap_or_default()
    }

    fn get_rule(&self, guild_id: &str, rule_name: &str) -> Option<&Rule> {
        self.rules
            .get(guild_id)?
            .iter()
            .find(|r| r.rule_name == rule_name)
    }

    fn delete_rule(&mut self, guild_id: &str, rule_name: &str) -> Result<bool, StoreError> {
        Ok(self.remove(guild_id, rule_name))
    }
}

/// Rule store backed by a JSON file, saved after every change.
#[derive(Debug)]
pub struct JsonRuleStore {
    path: PathBuf,
    inner: MemoryRuleStore,
}

impl JsonRuleStore {
    /// Opens a rules file. A missing file yields an empty store.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let inner = if path.exists() {
            MemoryRuleStore::load_from_file(&path)?
        } else {
            debug!("Rules file {} not found, starting empty", path.display());
            MemoryRuleStore::new()
        };

        Ok(Self { path, inner })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub const fn rules(&self) -> &MemoryRuleStore {
        &self.inner
    }

    /// Applies `change`, then saves; restores the guild's rules if saving fails.
    fn commit<T>(
        &mut self,
        guild_id: &str,
        change: impl FnOnce(&mut MemoryRuleStore) -> T,
    ) -> Result<T, StoreError> {
        let previous = self.inner.rules.get(guild_id).cloned();
        let outcome = change(&mut self.inner);

        if let Err(e) = self.inner.save_to_file(&self.path) {
            warn!("Failed to save rules to {}: {}", self.path.display(), e);
            match previous {
                Some(rules) => {
                    self.inner.rules.insert(guild_id.to_owned(), rules);
                }
                None => {
                    self.inner.rules.remove(guild_id);
                }
            }
            return Err(e);
        }

        Ok(outcome)
    }
}

impl RuleStore for JsonRuleStore {
    fn set_rule(&mut self, guild_id: &str, rule: Rule) -> Result<(), StoreError> {
        self.commit(guild_id, |store| store.insert(guild_id, rule))
    }

    fn rule_names(&self, guild_id: &str) -> Vec<String> {
        self.inner.rule_names(guild_id)
    }

    fn get_rule(&self, guild_id: &str, rule_name: &str) -> Option<&Rule> {
        self.inner.get_rule(guild_id, rule_name)
    }

    fn delete_rule(&mut self, guild_id: &str, rule_name: &str) -> Result<bool, StoreError> {
        self.commit(guild_id, |store| store.remove(guild_id, rule_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(name: &str, filter: &str) -> Rule {
        Rule::new(
            name.to_owned(),
            vec![filter.to_owned()],
            vec!["general".to_owned()],
            vec!["all".to_owned()],
            RuleOptions::new(),
        )
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut store = MemoryRuleStore::new();
        store.set_rule("g", rule("a", "uwu")).unwrap();
        store.set_rule("g", rule("b", "uwu")).unwrap();
        store.set_rule("g", rule("a", "censor")).unwrap();

        assert_eq!(store.rule_names("g"), ["a", "b"]);
        assert_eq!(store.get_rule("g", "a").unwrap().filter_names, ["censor"]);
    }

    #[test]
    fn test_guilds_are_independent() {
        let mut store = MemoryRuleStore::new();
        store.set_rule("g1", rule("a", "uwu")).unwrap();

        assert!(store.rule_names("g2").is_empty());
        assert!(store.get_rule("g2", "a").is_none());
        assert!(!store.delete_rule("g2", "a").unwrap());
        assert_eq!(store.rule_names("g1"), ["a"]);
    }

    #[test]
    fn test_delete_drops_empty_guild() {
        let mut store = MemoryRuleStore::new();
        store.set_rule("g", rule("a", "uwu")).unwrap();

        assert!(store.delete_rule("g", "a").unwrap());
        assert!(store.rules.is_empty());
        assert!(!store.delete_rule("g", "a").unwrap());
    }

    #[test]
    fn test_validate_all_flags_duplicates() {
        let mut store = MemoryRuleStore::new();
        store.rules.insert("g".to_owned(), vec![rule("a", "uwu"), rule("a", "censor")]);

        let results = store.validate_all();
        assert_eq!(results.len(), 2);
        assert!(results[0].2.is_ok());
        assert!(matches!(results[1].2, Err(RuleError::DuplicateName { .. })));
    }

    #[test]
    fn test_example_is_valid() {
        let example = MemoryRuleStore::example();
        assert_eq!(example.len(), 2);
        assert!(example.validate_all().iter().all(|(_, _, result)| result.is_ok()));
    }

    #[test]
    fn test_json_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonRuleStore::open(dir.path().join("rules.json")).unwrap();
        assert!(store.rules().is_empty());
    }

    #[test]
    fn test_json_store_persists_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");

        let mut store = JsonRuleStore::open(&path).unwrap();
        store.set_rule("g", rule("a", "uwu")).unwrap();
        store.set_rule("g", rule("b", "censor")).unwrap();
        store.delete_rule("g", "a").unwrap();

        let reopened = JsonRuleStore::open(&path).unwrap();
        assert_eq!(reopened.rule_names("g"), ["b"]);
        assert_eq!(reopened.rules(), store.rules());
    }

    #[test]
    fn test_json_store_rolls_back_on_save_failure() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be written as a file.
        let mut store = JsonRuleStore {
            path: dir.path().to_path_buf(),
            inner: MemoryRuleStore::new(),
        };

        assert!(store.set_rule("g", rule("a", "uwu")).is_err());
        assert!(store.rule_names("g").is_empty());
    }

    #[test]
    fn test_load_rejects_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            JsonRuleStore::open(&path),
            Err(StoreError::Parse(_))
        ));
    }
}
