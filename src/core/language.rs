//! Languages a toolchain can be configured for.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::key::Key;

/// Source language whose compiler is being selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// C language (default)
    #[default]
    C,
    /// C++ language
    #[serde(alias = "cpp", alias = "c++")]
    Cxx,
    /// Fortran
    #[serde(alias = "fc")]
    Fortran,
}

impl Language {
    /// All supported languages.
    pub const ALL: [Language; 3] = [Language::C, Language::Cxx, Language::Fortran];

    /// Get the language name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::C => "c",
            Language::Cxx => "c++",
            Language::Fortran => "fortran",
        }
    }

    /// Human-readable description used in progress messages.
    pub fn describe(&self) -> &'static str {
        match self {
            Language::C => "C compiler",
            Language::Cxx => "C++ compiler",
            Language::Fortran => "Fortran compiler",
        }
    }

    /// Key a loader must populate for its probe to count as a success.
    pub fn compiler_key(&self) -> Key {
        match self {
            Language::C => Key::Cc,
            Language::Cxx => Key::Cxx,
            Language::Fortran => Key::Fc,
        }
    }

    /// Key holding the compiler family name.
    pub fn name_key(&self) -> Key {
        match self {
            Language::C => Key::CcName,
            Language::Cxx => Key::CxxName,
            Language::Fortran => Key::FcName,
        }
    }

    /// Key holding the name of the compiler a family emulator really is.
    pub fn secondary_name_key(&self) -> Option<Key> {
        match self {
            Language::C => Some(Key::CcNameSecondary),
            Language::Cxx => Some(Key::CxxNameSecondary),
            Language::Fortran => None,
        }
    }

    /// Key holding the compiler version.
    pub fn version_key(&self) -> Key {
        match self {
            Language::C => Key::CcVersion,
            Language::Cxx => Key::CxxVersion,
            Language::Fortran => Key::FcVersion,
        }
    }

    /// Key holding the link driver.
    pub fn link_key(&self) -> Key {
        match self {
            Language::C => Key::LinkCc,
            Language::Cxx => Key::LinkCxx,
            Language::Fortran => Key::LinkFc,
        }
    }

    /// Key holding compile flags.
    pub fn flags_key(&self) -> Key {
        match self {
            Language::C => Key::CFlags,
            Language::Cxx => Key::CxxFlags,
            Language::Fortran => Key::FcFlags,
        }
    }

    /// Key recording which candidate was selected.
    pub fn selection_key(&self) -> Key {
        match self {
            Language::C => Key::CompilerC,
            Language::Cxx => Key::CompilerCxx,
            Language::Fortran => Key::CompilerFortran,
        }
    }

    /// Override variable naming the compiler (`CC`, `CXX`, `FC`).
    pub fn override_var(&self) -> &'static str {
        self.compiler_key().as_str()
    }

    /// Override variable carrying extra compile flags.
    pub fn flags_var(&self) -> &'static str {
        self.flags_key().as_str()
    }
}

impl std::str::FromStr for Language {
    type Err = LanguageParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "c" => Ok(Language::C),
            "c++" | "cxx" | "cpp" => Ok(Language::Cxx),
            "fortran" | "fc" => Ok(Language::Fortran),
            _ => Err(LanguageParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an invalid language name.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid language '{0}', valid values: c, c++, fortran")]
pub struct LanguageParseError(pub String);

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Command-line convention a configured compiler follows.
///
/// Decides which auxiliary tools are needed and how flag templates look.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ToolchainFamily {
    /// `gcc`-style drivers (gcc, clang, icc, gfortran, ...)
    #[default]
    Gnu,
    /// `cl.exe`-style drivers (msvc, clang-cl)
    Msvc,
}

impl ToolchainFamily {
    /// Infer the family from a compiler family name such as `CC_NAME`.
    pub fn from_compiler_name(name: &str) -> Self {
        match name {
            "msvc" => ToolchainFamily::Msvc,
            _ => ToolchainFamily::Gnu,
        }
    }

    /// Get the family name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolchainFamily::Gnu => "gnu",
            ToolchainFamily::Msvc => "msvc",
        }
    }
}

impl fmt::Display for ToolchainFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
