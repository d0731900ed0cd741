//! The loader capability and the registry of loaders.
//!
//! A loader is an opaque probe: it tries to configure one toolchain against
//! the shared environment and reports success or failure. The selector never
//! inspects what a loader does, only what it leaves behind.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use crate::core::{Environment, Key, Language, Overrides, PlatformKey, SearchSources};
use crate::util::process::{CommandRunner, ProcessOutput, SystemRunner};

use super::locator::ToolLocator;

/// Result of one loader invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The loader ran to completion.
    Success,
    /// The loader could not configure its toolchain.
    Failure(String),
}

impl ProbeOutcome {
    /// A failure with a reason.
    pub fn failure(reason: impl fmt::Display) -> Self {
        ProbeOutcome::Failure(reason.to_string())
    }

    /// Whether the loader succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, ProbeOutcome::Success)
    }
}

impl From<Result<()>> for ProbeOutcome {
    fn from(result: Result<()>) -> Self {
        match result {
            Ok(()) => ProbeOutcome::Success,
            Err(e) => ProbeOutcome::Failure(format!("{:#}", e)),
        }
    }
}

/// Everything about the machine a loader may consult.
pub struct Host {
    locator: ToolLocator,
    runner: Box<dyn CommandRunner>,
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("locator", &self.locator)
            .finish_non_exhaustive()
    }
}

impl Host {
    /// A host that searches and runs real programs.
    pub fn new(platform: PlatformKey, overrides: Overrides) -> Self {
        Host {
            locator: ToolLocator::new(platform, overrides),
            runner: Box::new(SystemRunner),
        }
    }

    /// A host with a custom locator.
    pub fn with_locator(locator: ToolLocator) -> Self {
        Host {
            locator,
            runner: Box::new(SystemRunner),
        }
    }

    /// Replace the command runner.
    pub fn with_runner(mut self, runner: impl CommandRunner + 'static) -> Self {
        self.runner = Box::new(runner);
        self
    }

    /// The tool locator.
    pub fn locator(&self) -> &ToolLocator {
        &self.locator
    }

    /// The platform being configured.
    pub fn platform(&self) -> &PlatformKey {
        self.locator.platform()
    }

    /// The run's overrides.
    pub fn overrides(&self) -> &Overrides {
        self.locator.overrides()
    }

    /// Run a program.
    pub fn run(&self, program: &Path, args: &[&str]) -> Result<ProcessOutput> {
        self.runner.run(program, args)
    }
}

/// What a loader works with during one probe.
pub struct ProbeContext<'a> {
    /// The shared environment; writes are rolled back if the probe fails
    pub env: &'a mut Environment,
    pub host: &'a Host,
    /// Language being selected
    pub language: Language,
}

impl<'a> ProbeContext<'a> {
    /// Create a probe context.
    pub fn new(env: &'a mut Environment, host: &'a Host, language: Language) -> Self {
        ProbeContext {
            env,
            host,
            language,
        }
    }

    /// Locate the first available program and store it under `key`.
    pub fn find_program(
        &mut self,
        programs: &[String],
        sources: &SearchSources,
        key: Key,
    ) -> Result<PathBuf> {
        let located = self.host.locator().locate_any(programs, sources, self.env);
        match located.into_path() {
            Some(path) => {
                self.env.set(key, path.as_path());
                Ok(path)
            }
            None => bail!("could not find the program `{}`", programs.join("` or `")),
        }
    }

    /// Run a program through the host.
    pub fn run(&self, program: &Path, args: &[&str]) -> Result<ProcessOutput> {
        self.host.run(program, args)
    }
}

/// A toolchain implementation that can be probed.
pub trait ToolchainLoader {
    /// Try to configure this toolchain.
    ///
    /// A loader may leave partial writes behind when it fails; the selector
    /// discards them.
    fn load(&self, ctx: &mut ProbeContext<'_>) -> ProbeOutcome;
}

/// A loader defined by a closure.
pub struct FnLoader<F>(pub F);

impl<F> ToolchainLoader for FnLoader<F>
where
    F: Fn(&mut ProbeContext<'_>) -> ProbeOutcome,
{
    fn load(&self, ctx: &mut ProbeContext<'_>) -> ProbeOutcome {
        (self.0)(ctx)
    }
}

/// Maps candidate names to loaders.
#[derive(Default)]
pub struct LoaderRegistry {
    loaders: BTreeMap<String, Box<dyn ToolchainLoader>>,
}

impl fmt::Debug for LoaderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.loaders.keys()).finish()
    }
}

impl LoaderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        LoaderRegistry {
            loaders: BTreeMap::new(),
        }
    }

    /// Register a loader, replacing any previous one with the same name.
    pub fn register(&mut self, name: impl Into<String>, loader: impl ToolchainLoader + 'static) {
        self.loaders.insert(name.into(), Box::new(loader));
    }

    /// Register a closure as a loader.
    pub fn register_fn<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&mut ProbeContext<'_>) -> ProbeOutcome + 'static,
    {
        self.register(name, FnLoader(f));
    }

    /// Look up a loader.
    pub fn get(&self, name: &str) -> Option<&dyn ToolchainLoader> {
        self.loaders.get(name).map(|l| l.as_ref())
    }

    /// Whether a loader is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.loaders.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.loaders.keys().map(String::as_str)
    }
}
