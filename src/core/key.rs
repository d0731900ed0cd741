//! The environment key schema.
//!
//! Every fact berth records lives under one of these keys. The names are
//! stable upper-case identifiers, used both for display and for the
//! persisted environment cache.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! keys {
    ($( $(#[$doc:meta])* $variant:ident => $name:literal, )*) => {
        /// A key in the configuration [`Environment`](crate::core::Environment).
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum Key {
            $(
                $(#[$doc])*
                #[serde(rename = $name)]
                $variant,
            )*
        }

        impl Key {
            /// Every key in schema order.
            pub const ALL: &'static [Key] = &[$(Key::$variant,)*];

            /// The stable upper-case name of this key.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Key::$variant => $name,)*
                }
            }
        }

        impl FromStr for Key {
            type Err = UnknownKeyError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(Key::$variant),)*
                    _ => Err(UnknownKeyError(s.to_string())),
                }
            }
        }
    };
}

keys! {
    /// Directories searched for programs
    Path => "PATH",
    /// Target operating system family
    DestOs => "DEST_OS",

    /// C compiler
    Cc => "CC",
    /// C++ compiler
    Cxx => "CXX",
    /// Fortran compiler
    Fc => "FC",
    /// C compiler family (gcc, clang, msvc, ...)
    CcName => "CC_NAME",
    /// C++ compiler family
    CxxName => "CXX_NAME",
    /// Fortran compiler family
    FcName => "FC_NAME",
    /// Front-end family when a compiler emulates another (clang-cl)
    CcNameSecondary => "CC_NAME_SECONDARY",
    CxxNameSecondary => "CXX_NAME_SECONDARY",
    CcVersion => "CC_VERSION",
    CxxVersion => "CXX_VERSION",
    FcVersion => "FC_VERSION",

    /// Link driver for C programs
    LinkCc => "LINK_CC",
    /// Link driver for C++ programs
    LinkCxx => "LINK_CXX",
    /// Link driver for Fortran programs
    LinkFc => "LINK_FC",

    /// Static library archiver
    Ar => "AR",
    ArFlags => "ARFLAGS",
    /// Archive index generator
    Ranlib => "RANLIB",
    /// Manifest tool
    Mt => "MT",
    MtFlags => "MTFLAGS",
    /// Whether manifests are embedded (requires MT)
    MsvcManifest => "MSVC_MANIFEST",
    /// Resource compiler
    WinRc => "WINRC",
    WinRcFlags => "WINRCFLAGS",
    /// Whether resource files can be compiled (requires WINRC)
    WinRcEnabled => "WINRC_ENABLED",
    MsvcCompiler => "MSVC_COMPILER",
    MsvcVersion => "MSVC_VERSION",
    /// LLVM installation directory
    LlvmPath => "LLVM_PATH",

    CFlags => "CFLAGS",
    CxxFlags => "CXXFLAGS",
    FcFlags => "FCFLAGS",
    LinkFlags => "LINKFLAGS",
    Includes => "INCLUDES",
    LibPath => "LIBPATH",

    DefinesSt => "DEFINES_ST",
    IncpathsSt => "INCPATHS_ST",
    LibSt => "LIB_ST",
    LibpathSt => "LIBPATH_ST",
    CcTgtF => "CC_TGT_F",
    LinkTgtF => "LINK_TGT_F",
    ProgramPattern => "PROGRAM_PATTERN",
    StlibPattern => "STLIB_PATTERN",
    ShlibPattern => "SHLIB_PATTERN",

    /// Candidate selected for C
    CompilerC => "COMPILER_CC",
    /// Candidate selected for C++
    CompilerCxx => "COMPILER_CXX",
    /// Candidate selected for Fortran
    CompilerFortran => "COMPILER_FC",
    /// Candidate selected by the most recent successful probe
    ToolchainName => "TOOLCHAIN_NAME",
    /// Identity of the selected toolchain (e.g. `gcc-13.2.0`)
    ToolchainIdentity => "TOOLCHAIN_IDENTITY",
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a name outside the key schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown environment key `{0}`")]
pub struct UnknownKeyError(pub String);
