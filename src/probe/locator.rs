//! Tiered program lookup.
//!
//! A program is looked up in a fixed precedence, first match wins:
//!
//! 1. Override variables supplied for this run (`CC`, `LLVM_PATH`, ...)
//! 2. Paths cached in the environment by an earlier stage
//! 3. The system search path
//! 4. On Windows only, a vendor install record from the registry. Its
//!    directory is prepended to the system path and the search re-run.
//!
//! A value from sources 1 and 2 may name the program itself, a directory to
//! search, or a bare program name to look up on the system path.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::{Environment, Key, Overrides, PlatformKey, RegistryQuery, SearchSources};
use crate::util::process::ProcessBuilder;

/// Finds executables by name in a list of directories.
pub trait ProgramFinder {
    /// Search `dirs` in order for `program`.
    fn find_in(&self, program: &str, dirs: &[PathBuf]) -> Option<PathBuf>;

    /// Whether `path` names an executable program.
    fn is_program(&self, path: &Path) -> bool;

    /// Whether `path` names a directory.
    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }
}

/// [`ProgramFinder`] backed by the `which` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhichFinder;

impl ProgramFinder for WhichFinder {
    fn find_in(&self, program: &str, dirs: &[PathBuf]) -> Option<PathBuf> {
        if dirs.is_empty() {
            return None;
        }
        let joined = std::env::join_paths(dirs).ok()?;
        let cwd = std::env::current_dir().ok()?;
        which::which_in(program, Some(joined), cwd).ok()
    }

    fn is_program(&self, path: &Path) -> bool {
        path.is_file() && which::which(path).is_ok()
    }
}

/// Looks up vendor install locations in a platform registry.
pub trait InstallRegistry {
    /// Return the install directory recorded for `query`, if any.
    fn install_dir(&self, query: &RegistryQuery) -> Option<PathBuf>;
}

/// Reads `HKEY_LOCAL_MACHINE` records through `reg query`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsRegistry;

impl InstallRegistry for WindowsRegistry {
    fn install_dir(&self, query: &RegistryQuery) -> Option<PathBuf> {
        for key in &query.keys {
            let full_key = format!("HKLM\\{}", key);
            let mut cmd = ProcessBuilder::new("reg").args(["query", full_key.as_str()]);
            cmd = if query.value.is_empty() {
                cmd.arg("/ve")
            } else {
                cmd.args(["/v", query.value.as_str()])
            };

            match cmd.exec() {
                Ok(out) if out.status.success() => {
                    let stdout = String::from_utf8_lossy(&out.stdout);
                    if let Some(value) = parse_reg_value(&stdout) {
                        tracing::debug!("registry {} -> {}", full_key, value);
                        return Some(PathBuf::from(value));
                    }
                }
                Ok(_) => tracing::debug!("registry key not found: {}", full_key),
                Err(e) => tracing::debug!("failed to run reg query: {}", e),
            }
        }
        None
    }
}

/// Extract the data of the first string value in `reg query` output.
fn parse_reg_value(output: &str) -> Option<String> {
    for line in output.lines() {
        for ty in ["REG_EXPAND_SZ", "REG_SZ"] {
            if let Some(idx) = line.find(ty) {
                let value = line[idx + ty.len()..].trim();
                if !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
    }
    None
}

/// The source that produced a located program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocateSource {
    /// An override variable
    Override(String),
    /// A path cached in the environment
    Cached(Key),
    /// The system search path
    SystemPath,
    /// A registry install directory
    Registry(PathBuf),
}

impl fmt::Display for LocateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocateSource::Override(var) => write!(f, "override {}", var),
            LocateSource::Cached(key) => write!(f, "cached {}", key),
            LocateSource::SystemPath => write!(f, "PATH"),
            LocateSource::Registry(dir) => write!(f, "registry ({})", dir.display()),
        }
    }
}

/// Result of a lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Located {
    Found { path: PathBuf, source: LocateSource },
    NotFound,
}

impl Located {
    /// The resolved path, if found.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Located::Found { path, .. } => Some(path),
            Located::NotFound => None,
        }
    }

    /// Convert into the resolved path, if found.
    pub fn into_path(self) -> Option<PathBuf> {
        match self {
            Located::Found { path, .. } => Some(path),
            Located::NotFound => None,
        }
    }

    /// Whether the program was found.
    pub fn is_found(&self) -> bool {
        matches!(self, Located::Found { .. })
    }
}

/// Resolves program names to paths.
pub struct ToolLocator {
    platform: PlatformKey,
    overrides: Overrides,
    system_path: Vec<PathBuf>,
    finder: Box<dyn ProgramFinder>,
    registry: Option<Box<dyn InstallRegistry>>,
}

impl fmt::Debug for ToolLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolLocator")
            .field("platform", &self.platform)
            .field("overrides", &self.overrides)
            .field("system_path", &self.system_path)
            .field("registry", &self.registry.is_some())
            .finish()
    }
}

impl ToolLocator {
    /// Create a locator for a platform.
    ///
    /// The system path comes from the `PATH` override when present, otherwise
    /// from the process environment. The registry is only wired up for Windows.
    pub fn new(platform: PlatformKey, overrides: Overrides) -> Self {
        let system_path = if overrides.get("PATH").is_some() {
            overrides.paths("PATH")
        } else {
            std::env::var_os("PATH")
                .map(|p| std::env::split_paths(&p).collect())
                .unwrap_or_default()
        };

        let registry: Option<Box<dyn InstallRegistry>> = if platform.is_windows() {
            Some(Box::new(WindowsRegistry))
        } else {
            None
        };

        ToolLocator {
            platform,
            overrides,
            system_path,
            finder: Box::new(WhichFinder),
            registry,
        }
    }

    /// Replace the program finder.
    pub fn with_finder(mut self, finder: impl ProgramFinder + 'static) -> Self {
        self.finder = Box::new(finder);
        self
    }

    /// Replace the install registry.
    pub fn with_registry(mut self, registry: impl InstallRegistry + 'static) -> Self {
        self.registry = Some(Box::new(registry));
        self
    }

    /// Replace the system search path.
    pub fn with_system_path(mut self, dirs: Vec<PathBuf>) -> Self {
        self.system_path = dirs;
        self
    }

    /// The platform this locator searches for.
    pub fn platform(&self) -> &PlatformKey {
        &self.platform
    }

    /// The run's overrides.
    pub fn overrides(&self) -> &Overrides {
        &self.overrides
    }

    /// The system search path.
    pub fn system_path(&self) -> &[PathBuf] {
        &self.system_path
    }

    /// Locate a program.
    pub fn locate(&self, program: &str, sources: &SearchSources, env: &Environment) -> Located {
        for var in &sources.overrides {
            if let Some(value) = self.overrides.get(var) {
                if let Some(path) = self.resolve_value(program, value) {
                    return Located::Found {
                        path,
                        source: LocateSource::Override(var.clone()),
                    };
                }
                tracing::debug!("override {}={} does not provide `{}`", var, value, program);
            }
        }

        for key in &sources.cached {
            let value = env.get_flat(*key);
            if value.is_empty() {
                continue;
            }
            if let Some(path) = self.resolve_value(program, &value) {
                return Located::Found {
                    path,
                    source: LocateSource::Cached(*key),
                };
            }
            tracing::debug!("cached {}={} does not provide `{}`", key, value, program);
        }

        if sources.system_path {
            if let Some(path) = self.finder.find_in(program, &self.system_path) {
                return Located::Found {
                    path,
                    source: LocateSource::SystemPath,
                };
            }
        }

        if self.platform.is_windows() {
            if let (Some(query), Some(registry)) = (&sources.registry, &self.registry) {
                if let Some(dir) = registry.install_dir(query) {
                    let dir = match &query.subdir {
                        Some(sub) => dir.join(sub),
                        None => dir,
                    };
                    let mut dirs = vec![dir.clone()];
                    dirs.extend(self.system_path.iter().cloned());
                    if let Some(path) = self.finder.find_in(program, &dirs) {
                        return Located::Found {
                            path,
                            source: LocateSource::Registry(dir),
                        };
                    }
                }
            }
        }

        tracing::debug!("`{}` not found", program);
        Located::NotFound
    }

    /// Locate the first of several alternative programs.
    pub fn locate_any(
        &self,
        programs: &[String],
        sources: &SearchSources,
        env: &Environment,
    ) -> Located {
        programs
            .iter()
            .map(|program| self.locate(program, sources, env))
            .find(Located::is_found)
            .unwrap_or(Located::NotFound)
    }

    /// Interpret an override or cached value for `program`.
    fn resolve_value(&self, program: &str, value: &str) -> Option<PathBuf> {
        let path = Path::new(value);
        if self.finder.is_program(path) {
            return Some(path.to_path_buf());
        }
        if self.finder.is_dir(path) {
            return self.finder.find_in(program, &[path.to_path_buf()]);
        }
        if path.components().count() == 1 {
            return self.finder.find_in(value, &self.system_path);
        }
        None
    }
}
