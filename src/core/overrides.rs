//! Environment-variable-style overrides supplied for a configuration run.

use std::collections::BTreeMap;
use std::path::PathBuf;

/// Variables consulted before anything berth discovers on its own
/// (`CC`, `AR`, `LLVM_PATH`, `CFLAGS`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    vars: BTreeMap<String, String>,
}

/// Variables captured from the process environment.
const CAPTURED_VARS: &[&str] = &[
    "PATH", "CC", "CXX", "FC", "AR", "RANLIB", "MT", "WINRC", "LLVM_PATH", "CPPFLAGS", "CFLAGS",
    "CXXFLAGS", "FCFLAGS", "LDFLAGS", "INCLUDE", "LIB",
];

impl Overrides {
    /// Create an empty set of overrides.
    pub fn new() -> Self {
        Overrides {
            vars: BTreeMap::new(),
        }
    }

    /// Capture the relevant variables from the process environment.
    pub fn from_process_env() -> Self {
        let mut overrides = Overrides::new();
        for var in CAPTURED_VARS {
            if let Ok(value) = std::env::var(var) {
                overrides.set(*var, value);
            }
        }
        overrides
    }

    /// Set a variable.
    pub fn set(&mut self, var: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(var.into(), value.into());
    }

    /// Builder form of [`Overrides::set`].
    pub fn with(mut self, var: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(var, value);
        self
    }

    /// Get a variable if it is present and non-empty.
    pub fn get(&self, var: &str) -> Option<&str> {
        self.vars
            .get(var)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// Split a flag variable with shell quoting rules.
    ///
    /// A value with unbalanced quotes is split on whitespace instead.
    pub fn flags(&self, var: &str) -> Vec<String> {
        let Some(value) = self.get(var) else {
            return Vec::new();
        };
        shlex::split(value).unwrap_or_else(|| {
            tracing::warn!("{} has unbalanced quotes, splitting on whitespace", var);
            value.split_whitespace().map(str::to_string).collect()
        })
    }

    /// Split a path-list variable using the platform separator.
    pub fn paths(&self, var: &str) -> Vec<PathBuf> {
        self.get(var)
            .map(|v| std::env::split_paths(v).collect())
            .unwrap_or_default()
    }

    /// Fill in variables that are not already set (existing values win).
    pub fn merge_missing(&mut self, other: Overrides) {
        for (var, value) in other.vars {
            self.vars.entry(var).or_insert(value);
        }
    }

    /// Iterate over all variables.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
