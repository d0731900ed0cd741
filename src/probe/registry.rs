//! Platform-keyed candidate tables.
//!
//! For each language, maps a platform key to the ordered list of toolchain
//! names worth trying there. Platforms without an entry fall back to
//! `default`.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::core::{Language, PlatformKey};

/// Table key used when a platform has no entry of its own.
pub const DEFAULT_PLATFORM: &str = "default";

static CANDIDATE_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ ,]+").expect("valid separator pattern"));

const C_CANDIDATES: &[(&str, &[&str])] = &[
    ("win32", &["msvc", "gcc", "clang"]),
    ("cygwin", &["gcc", "clang"]),
    ("darwin", &["clang", "gcc"]),
    ("aix", &["xlc", "gcc", "clang"]),
    ("linux", &["gcc", "clang", "icc"]),
    ("sunos", &["suncc", "gcc"]),
    ("gnu", &["gcc", "clang"]),
    ("java", &["gcc", "msvc", "clang", "icc"]),
    ("freebsd", &["clang", "gcc"]),
    (DEFAULT_PLATFORM, &["clang", "gcc"]),
];

const CXX_CANDIDATES: &[(&str, &[&str])] = &[
    ("win32", &["msvc", "g++", "clang++"]),
    ("cygwin", &["g++", "clang++"]),
    ("darwin", &["clang++", "g++"]),
    ("aix", &["xlc++", "g++", "clang++"]),
    ("linux", &["g++", "clang++", "icpc"]),
    ("sunos", &["sunc++", "g++"]),
    ("gnu", &["g++", "clang++"]),
    ("java", &["g++", "msvc", "clang++", "icpc"]),
    ("freebsd", &["clang++", "g++"]),
    (DEFAULT_PLATFORM, &["clang++", "g++"]),
];

const FORTRAN_CANDIDATES: &[(&str, &[&str])] = &[
    ("win32", &["gfortran", "ifort"]),
    ("darwin", &["gfortran", "g95", "ifort"]),
    ("linux", &["gfortran", "g95", "ifort"]),
    ("java", &["gfortran", "g95", "ifort"]),
    ("aix", &["gfortran"]),
    (DEFAULT_PLATFORM, &["gfortran"]),
];

/// Ordered candidate lists per language and platform.
#[derive(Debug, Clone, Default)]
pub struct CandidateRegistry {
    tables: BTreeMap<Language, BTreeMap<String, Vec<String>>>,
}

impl CandidateRegistry {
    /// Create a registry with no entries.
    pub fn empty() -> Self {
        CandidateRegistry {
            tables: BTreeMap::new(),
        }
    }

    /// Create a registry with the built-in tables.
    pub fn builtin() -> Self {
        let mut registry = CandidateRegistry::empty();
        for (language, table) in [
            (Language::C, C_CANDIDATES),
            (Language::Cxx, CXX_CANDIDATES),
            (Language::Fortran, FORTRAN_CANDIDATES),
        ] {
            for (platform, names) in table {
                registry.set(
                    language,
                    *platform,
                    names.iter().map(|n| n.to_string()).collect(),
                );
            }
        }
        registry
    }

    /// Replace the list for one platform (use [`DEFAULT_PLATFORM`] for the fallback).
    pub fn set(&mut self, language: Language, platform: impl Into<String>, names: Vec<String>) {
        self.tables
            .entry(language)
            .or_default()
            .insert(platform.into(), names);
    }

    /// Candidates for a platform, falling back to the `default` entry.
    ///
    /// Returns an empty slice when neither exists.
    pub fn candidates_for(&self, language: Language, platform: &PlatformKey) -> &[String] {
        let Some(table) = self.tables.get(&language) else {
            return &[];
        };
        table
            .get(platform.as_str())
            .or_else(|| table.get(DEFAULT_PLATFORM))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Platforms with an explicit entry for a language.
    pub fn platforms(&self, language: Language) -> Vec<&str> {
        self.tables
            .get(&language)
            .map(|t| t.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

/// Split a user-supplied candidate list on commas and spaces.
pub fn split_candidates(list: &str) -> Vec<String> {
    CANDIDATE_SEPARATOR
        .split(list.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
