//! Configuration file support for berth.
//!
//! berth supports two configuration file locations:
//! - Global: `~/.berth/config.toml` - User-wide defaults
//! - Project: `.berth/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config.
//!
//! The result of `berth configure` is cached next to the project config in
//! `.berth/env.json`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::{Language, Overrides};

/// Name of the per-project state directory.
pub const STATE_DIR: &str = ".berth";

/// berth configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Candidate lists replacing the built-in table for the host platform
    pub candidates: CandidateConfig,

    /// Tool paths, applied as overrides
    pub tools: ToolsConfig,

    /// Extra flags appended by the flag pipeline
    pub flags: FlagSettings,

    /// Custom GNU-style toolchains, by candidate name
    pub toolchains: BTreeMap<String, CustomToolchain>,
}

/// Per-language candidate lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateConfig {
    pub c: Option<Vec<String>>,
    pub cxx: Option<Vec<String>>,
    pub fortran: Option<Vec<String>>,
}

impl CandidateConfig {
    /// The configured list for a language, if any.
    pub fn for_language(&self, language: Language) -> Option<&[String]> {
        match language {
            Language::C => self.c.as_deref(),
            Language::Cxx => self.cxx.as_deref(),
            Language::Fortran => self.fortran.as_deref(),
        }
    }
}

/// Paths to specific tools.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Path to the C compiler (e.g., /usr/bin/clang)
    pub cc: Option<PathBuf>,

    /// Path to the C++ compiler (e.g., /usr/bin/clang++)
    pub cxx: Option<PathBuf>,

    /// Path to the Fortran compiler
    pub fc: Option<PathBuf>,

    /// Path to the archiver (e.g., /usr/bin/llvm-ar)
    pub ar: Option<PathBuf>,

    /// Directory holding the LLVM binaries (clang-cl, llvm-lib, ...)
    pub llvm_path: Option<PathBuf>,
}

/// Extra flags, appended after those taken from the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlagSettings {
    /// Additional C compiler flags
    pub cflags: Vec<String>,

    /// Additional C++ compiler flags
    pub cxxflags: Vec<String>,

    /// Additional Fortran compiler flags
    pub fcflags: Vec<String>,

    /// Additional linker flags
    pub ldflags: Vec<String>,
}

impl FlagSettings {
    /// Extra compile flags for a language.
    pub fn for_language(&self, language: Language) -> &[String] {
        match language {
            Language::C => &self.cflags,
            Language::Cxx => &self.cxxflags,
            Language::Fortran => &self.fcflags,
        }
    }
}

/// A user-declared toolchain driven like gcc.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomToolchain {
    /// Program name or path of the compiler driver
    pub program: String,

    /// Languages the driver compiles
    #[serde(default = "default_languages")]
    pub languages: Vec<Language>,
}

fn default_languages() -> Vec<Language> {
    vec![Language::C]
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        // Candidate lists
        if other.candidates.c.is_some() {
            self.candidates.c = other.candidates.c;
        }
        if other.candidates.cxx.is_some() {
            self.candidates.cxx = other.candidates.cxx;
        }
        if other.candidates.fortran.is_some() {
            self.candidates.fortran = other.candidates.fortran;
        }

        // Tool paths
        if other.tools.cc.is_some() {
            self.tools.cc = other.tools.cc;
        }
        if other.tools.cxx.is_some() {
            self.tools.cxx = other.tools.cxx;
        }
        if other.tools.fc.is_some() {
            self.tools.fc = other.tools.fc;
        }
        if other.tools.ar.is_some() {
            self.tools.ar = other.tools.ar;
        }
        if other.tools.llvm_path.is_some() {
            self.tools.llvm_path = other.tools.llvm_path;
        }

        // Flags are replaced, not merged
        if !other.flags.cflags.is_empty() {
            self.flags.cflags = other.flags.cflags;
        }
        if !other.flags.cxxflags.is_empty() {
            self.flags.cxxflags = other.flags.cxxflags;
        }
        if !other.flags.fcflags.is_empty() {
            self.flags.fcflags = other.flags.fcflags;
        }
        if !other.flags.ldflags.is_empty() {
            self.flags.ldflags = other.flags.ldflags;
        }

        self.toolchains.extend(other.toolchains);
    }

    /// Tool paths as override variables.
    pub fn overrides(&self) -> Overrides {
        let mut overrides = Overrides::new();
        for (var, path) in [
            ("CC", &self.tools.cc),
            ("CXX", &self.tools.cxx),
            ("FC", &self.tools.fc),
            ("AR", &self.tools.ar),
            ("LLVM_PATH", &self.tools.llvm_path),
        ] {
            if let Some(path) = path {
                overrides.set(var, path.display().to_string());
            }
        }
        overrides
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.berth/config.toml)
/// 2. Global config (~/.berth/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    // Load global config first
    if let Some(global_path) = global_path {
        if global_path.exists() {
            config.merge(Config::load_or_default(global_path));
        }
    }

    // Project config overrides global
    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Get the global berth config directory (~/.berth).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(STATE_DIR))
}

/// Get the global config path (~/.berth/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.berth/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(STATE_DIR).join("config.toml")
}

/// Get the environment cache path (.berth/env.json).
pub fn env_cache_path(project_root: &Path) -> PathBuf {
    project_root.join(STATE_DIR).join("env.json")
}
