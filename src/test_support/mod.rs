//! Test utilities and mocks for berth unit tests.
//!
//! This module provides mock implementations for the interfaces that touch
//! the host machine: the program finder, the install registry, and process
//! execution.
//!
//! # Example
//!
//! ```rust,ignore
//! use berth::test_support::{MockFinder, MockExecutor, MockProcessOutput};
//!
//! #[test]
//! fn test_example() {
//!     let finder = MockFinder::new().with_program("/usr/bin/gcc");
//!
//!     let mut exec = MockExecutor::new();
//!     exec.expect("/usr/bin/gcc --version", MockProcessOutput::success("gcc 12.0.0"));
//!
//!     // Use mocks in tests...
//! }
//! ```

pub mod fixtures;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};

use crate::core::RegistryQuery;
use crate::probe::locator::{InstallRegistry, ProgramFinder};
use crate::util::process::{CommandRunner, ProcessOutput};

// Re-export fixtures for convenience
pub use fixtures::*;

/// Mock program finder backed by a fixed set of executable paths.
///
/// A directory "exists" when at least one registered program lives in it.
#[derive(Debug, Clone, Default)]
pub struct MockFinder {
    programs: BTreeSet<PathBuf>,
}

impl MockFinder {
    /// Create a finder that knows no programs.
    pub fn new() -> Self {
        MockFinder {
            programs: BTreeSet::new(),
        }
    }

    /// Register an executable.
    pub fn with_program(mut self, path: impl AsRef<Path>) -> Self {
        self.programs.insert(path.as_ref().to_path_buf());
        self
    }
}

impl ProgramFinder for MockFinder {
    fn find_in(&self, program: &str, dirs: &[PathBuf]) -> Option<PathBuf> {
        dirs.iter()
            .map(|dir| dir.join(program))
            .find(|candidate| self.programs.contains(candidate))
    }

    fn is_program(&self, path: &Path) -> bool {
        self.programs.contains(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.programs.iter().any(|p| p.parent() == Some(path))
    }
}

/// Mock install registry that always answers with the same directory.
#[derive(Debug, Clone, Default)]
pub struct MockRegistry {
    dir: Option<PathBuf>,
    queries: Arc<Mutex<usize>>,
}

impl MockRegistry {
    /// Create a registry with no records.
    pub fn new() -> Self {
        MockRegistry::default()
    }

    /// Answer every query with `dir`.
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    /// Shared counter of how many times the registry was queried.
    pub fn queries(&self) -> Arc<Mutex<usize>> {
        Arc::clone(&self.queries)
    }
}

impl InstallRegistry for MockRegistry {
    fn install_dir(&self, _query: &RegistryQuery) -> Option<PathBuf> {
        if let Ok(mut count) = self.queries.lock() {
            *count += 1;
        }
        self.dir.clone()
    }
}

/// Mock process output for testing command execution.
#[derive(Debug, Clone)]
pub struct MockProcessOutput {
    /// Exit status code (0 = success).
    pub status: i32,
    /// Standard output.
    pub stdout: String,
    /// Standard error.
    pub stderr: String,
}

impl MockProcessOutput {
    /// Create a successful output with the given stdout.
    pub fn success(stdout: impl Into<String>) -> Self {
        MockProcessOutput {
            status: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Create a failure output with the given stderr and status code.
    pub fn failure(status: i32, stderr: impl Into<String>) -> Self {
        MockProcessOutput {
            status,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Create an output with both stdout and stderr.
    pub fn with_output(status: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        MockProcessOutput {
            status,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }
}

impl Default for MockProcessOutput {
    fn default() -> Self {
        MockProcessOutput::success("")
    }
}

impl From<MockProcessOutput> for ProcessOutput {
    fn from(mock: MockProcessOutput) -> Self {
        ProcessOutput {
            status: Some(mock.status),
            stdout: mock.stdout,
            stderr: mock.stderr,
        }
    }
}

/// Pattern for matching commands in MockExecutor.
#[derive(Debug, Clone)]
pub enum CommandPattern {
    /// Exact match on full command string.
    Exact(String),
    /// Match if command starts with prefix.
    StartsWith(String),
    /// Match if command contains substring.
    Contains(String),
}

impl CommandPattern {
    /// Check if this pattern matches the given command.
    pub fn matches(&self, cmd: &str) -> bool {
        match self {
            CommandPattern::Exact(s) => cmd == s,
            CommandPattern::StartsWith(s) => cmd.starts_with(s),
            CommandPattern::Contains(s) => cmd.contains(s),
        }
    }
}

/// Expectation for a command execution.
#[derive(Debug, Clone)]
struct CommandExpectation {
    pattern: CommandPattern,
    output: MockProcessOutput,
}

/// Mock process executor for testing compiler queries.
///
/// Commands are matched as `"{program} {args...}"` against expectations in
/// the order they were added. Unmatched commands fail to spawn, which is
/// what a missing or broken program looks like to a loader.
#[derive(Debug, Default)]
pub struct MockExecutor {
    expectations: Vec<CommandExpectation>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockExecutor {
    /// Create a new mock executor.
    pub fn new() -> Self {
        MockExecutor::default()
    }

    /// Add an expectation for an exact command match.
    pub fn expect(&mut self, cmd: &str, output: MockProcessOutput) -> &mut Self {
        self.expectations.push(CommandExpectation {
            pattern: CommandPattern::Exact(cmd.to_string()),
            output,
        });
        self
    }

    /// Add an expectation for a command starting with a prefix.
    pub fn expect_prefix(&mut self, prefix: &str, output: MockProcessOutput) -> &mut Self {
        self.expectations.push(CommandExpectation {
            pattern: CommandPattern::StartsWith(prefix.to_string()),
            output,
        });
        self
    }

    /// Add an expectation for a command containing a substring.
    pub fn expect_contains(&mut self, substring: &str, output: MockProcessOutput) -> &mut Self {
        self.expectations.push(CommandExpectation {
            pattern: CommandPattern::Contains(substring.to_string()),
            output,
        });
        self
    }

    /// Shared log of every command run, usable after the executor is moved.
    pub fn calls(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.calls)
    }
}

impl CommandRunner for MockExecutor {
    fn run(&self, program: &Path, args: &[&str]) -> Result<ProcessOutput> {
        let full_cmd = if args.is_empty() {
            program.display().to_string()
        } else {
            format!("{} {}", program.display(), args.join(" "))
        };

        if let Ok(mut calls) = self.calls.lock() {
            calls.push(full_cmd.clone());
        }

        match self
            .expectations
            .iter()
            .find(|exp| exp.pattern.matches(&full_cmd))
        {
            Some(exp) => Ok(exp.output.clone().into()),
            None => bail!("unexpected command: {}", full_cmd),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_finder() {
        let finder = MockFinder::new().with_program("/usr/bin/gcc");

        assert_eq!(
            finder.find_in("gcc", &[PathBuf::from("/opt/bin"), PathBuf::from("/usr/bin")]),
            Some(PathBuf::from("/usr/bin/gcc"))
        );
        assert_eq!(finder.find_in("clang", &[PathBuf::from("/usr/bin")]), None);
        assert!(finder.is_program(Path::new("/usr/bin/gcc")));
        assert!(finder.is_dir(Path::new("/usr/bin")));
        assert!(!finder.is_dir(Path::new("/opt/bin")));
    }

    #[test]
    fn test_mock_executor() {
        let mut exec = MockExecutor::new();
        exec.expect("gcc --version", MockProcessOutput::success("gcc 12.0.0"))
            .expect_prefix("clang", MockProcessOutput::success("clang version 15.0.0"))
            .expect_contains("cl", MockProcessOutput::failure(1, "bad"));

        let out = exec.run(Path::new("gcc"), &["--version"]).unwrap();
        assert_eq!(out.stdout, "gcc 12.0.0");

        let out = exec.run(Path::new("clang"), &["-v"]).unwrap();
        assert!(out.stdout.contains("clang version"));

        let out = exec.run(Path::new("cl"), &[]).unwrap();
        assert!(!out.success());

        assert!(exec.run(Path::new("ifort"), &[]).is_err());
        assert_eq!(exec.calls().lock().unwrap().len(), 4);
    }

    #[test]
    fn test_mock_registry_counts_queries() {
        let registry = MockRegistry::new().with_dir("C:/LLVM");
        let queries = registry.queries();

        assert_eq!(
            registry.install_dir(&RegistryQuery::llvm()),
            Some(PathBuf::from("C:/LLVM"))
        );
        assert_eq!(*queries.lock().unwrap(), 1);
    }
}
