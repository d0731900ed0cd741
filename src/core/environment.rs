//! The configuration environment.
//!
//! An [`Environment`] accumulates everything a configuration run discovers:
//! tool paths, compiler identity, flag lists. Probes mutate it freely and the
//! selector uses [`Environment::snapshot`] / [`Environment::restore`] to undo
//! the writes of a probe that failed.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::key::Key;

/// A value stored in the environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Str(String),
    List(Vec<String>),
}

impl Value {
    /// Flatten the value to a single string (lists are joined by spaces).
    pub fn flatten(&self) -> String {
        match self {
            Value::Bool(b) => b.to_string(),
            Value::Str(s) => s.clone(),
            Value::List(items) => items.join(" "),
        }
    }

    /// Whether the value carries no information (empty string or list).
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Bool(_) => false,
            Value::Str(s) => s.is_empty(),
            Value::List(items) => items.is_empty(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.flatten())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&Path> for Value {
    fn from(p: &Path) -> Self {
        Value::Str(p.display().to_string())
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Value::List(items)
    }
}

impl From<&[&str]> for Value {
    fn from(items: &[&str]) -> Self {
        Value::List(items.iter().map(|s| s.to_string()).collect())
    }
}

/// Mutable key-value configuration shared by every configuration stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Environment {
    table: BTreeMap<Key, Value>,
}

/// An owned copy of an environment's state, taken by [`Environment::snapshot`].
#[derive(Debug, Clone)]
pub struct Snapshot {
    table: BTreeMap<Key, Value>,
}

/// Keys that differ between a snapshot and the current environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnvDelta {
    /// Keys absent from the snapshot and present now
    pub added: Vec<Key>,
    /// Keys present in both with different values
    pub changed: Vec<Key>,
    /// Keys present in the snapshot and absent now
    pub removed: Vec<Key>,
}

impl EnvDelta {
    /// Whether nothing changed.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.changed.is_empty() && self.removed.is_empty()
    }

    /// Total number of keys touched.
    pub fn len(&self) -> usize {
        self.added.len() + self.changed.len() + self.removed.len()
    }
}

impl Environment {
    /// Create an empty environment.
    pub fn new() -> Self {
        Environment {
            table: BTreeMap::new(),
        }
    }

    /// Get the value for a key.
    pub fn get(&self, key: Key) -> Option<&Value> {
        self.table.get(&key)
    }

    /// Get a string value. Lists and booleans are not coerced.
    pub fn get_str(&self, key: Key) -> Option<&str> {
        match self.table.get(&key) {
            Some(Value::Str(s)) => Some(s),
            _ => None,
        }
    }

    /// Get a value as a list; a single string is returned as a one-element list.
    pub fn get_list(&self, key: Key) -> Vec<String> {
        match self.table.get(&key) {
            Some(Value::List(items)) => items.clone(),
            Some(Value::Str(s)) if !s.is_empty() => vec![s.clone()],
            _ => Vec::new(),
        }
    }

    /// Get a boolean value. `None` means the key is absent or not a boolean.
    pub fn get_bool(&self, key: Key) -> Option<bool> {
        match self.table.get(&key) {
            Some(Value::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    /// Get a value flattened to a string, or an empty string if absent.
    pub fn get_flat(&self, key: Key) -> String {
        self.table.get(&key).map(Value::flatten).unwrap_or_default()
    }

    /// Whether the key is present with a non-empty value.
    pub fn is_set(&self, key: Key) -> bool {
        self.table.get(&key).is_some_and(|v| !v.is_empty())
    }

    /// Whether the key is present at all.
    pub fn contains(&self, key: Key) -> bool {
        self.table.contains_key(&key)
    }

    /// Set a value, replacing any previous one.
    pub fn set(&mut self, key: Key, value: impl Into<Value>) {
        self.table.insert(key, value.into());
    }

    /// Remove a key, returning its previous value.
    pub fn unset(&mut self, key: Key) -> Option<Value> {
        self.table.remove(&key)
    }

    /// Append items to a list value, converting a string value to a list first.
    pub fn append_value<I, S>(&mut self, key: Key, items: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list = self.get_list(key);
        list.extend(items.into_iter().map(Into::into));
        self.table.insert(key, Value::List(list));
    }

    /// Append items that are not already present.
    ///
    /// Re-applying the same items leaves the environment unchanged.
    pub fn append_unique<I, S>(&mut self, key: Key, items: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list = self.get_list(key);
        for item in items {
            let item = item.into();
            if !list.contains(&item) {
                list.push(item);
            }
        }
        self.table.insert(key, Value::List(list));
    }

    /// Append a flag sequence unless it already appears contiguously.
    ///
    /// Paired flags such as `-arch x86_64 -arch arm64` stay intact, and
    /// re-applying the same sequence leaves the environment unchanged.
    pub fn append_flags<I, S>(&mut self, key: Key, items: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items: Vec<String> = items.into_iter().map(Into::into).collect();
        if items.is_empty() {
            return;
        }
        let list = self.get_list(key);
        if list.windows(items.len()).any(|w| w == items.as_slice()) {
            return;
        }
        self.append_value(key, items);
    }

    /// Capture the full current state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            table: self.table.clone(),
        }
    }

    /// Replace the current state with a snapshot, discarding every mutation
    /// made since it was taken.
    pub fn restore(&mut self, snapshot: Snapshot) {
        self.table = snapshot.table;
    }

    /// Compute which keys changed since a snapshot.
    pub fn diff(&self, snapshot: &Snapshot) -> EnvDelta {
        let mut delta = EnvDelta::default();
        for (key, value) in &self.table {
            match snapshot.table.get(key) {
                None => delta.added.push(*key),
                Some(old) if old != value => delta.changed.push(*key),
                Some(_) => {}
            }
        }
        for key in snapshot.table.keys() {
            if !self.table.contains_key(key) {
                delta.removed.push(*key);
            }
        }
        delta
    }

    /// Iterate over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (Key, &Value)> {
        self.table.iter().map(|(k, v)| (*k, v))
    }

    /// Number of keys set.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether the environment is empty.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Load a persisted environment.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read environment cache: {}", path.display()))?;

        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse environment cache: {}", path.display()))
    }

    /// Persist the environment, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create cache directory: {}", parent.display())
            })?;
        }

        let contents = serde_json::to_string_pretty(self)
            .with_context(|| "failed to serialize environment")?;

        std::fs::write(path, contents)
            .with_context(|| format!("failed to write environment cache: {}", path.display()))
    }
}
