//! Canned compiler output and host fixtures.

use std::path::PathBuf;

use crate::core::{Overrides, PlatformKey};
use crate::probe::locator::ToolLocator;
use crate::probe::Host;
use crate::util::shell::{ColorChoice, Shell, ShellMode, Verbosity};

use super::{MockExecutor, MockFinder};

/// Directory used as the system path by [`test_host`].
pub const BIN_DIR: &str = "/usr/bin";

/// Build a host whose system path is [`BIN_DIR`] and whose programs and
/// process output come from the given mocks.
pub fn test_host(
    platform: PlatformKey,
    overrides: Overrides,
    finder: MockFinder,
    exec: MockExecutor,
) -> Host {
    let locator = ToolLocator::new(platform, overrides)
        .with_finder(finder)
        .with_system_path(vec![PathBuf::from(BIN_DIR)]);
    Host::with_locator(locator).with_runner(exec)
}

/// A shell that prints nothing but errors and warnings.
pub fn quiet_shell() -> Shell {
    Shell::new(ShellMode::Human {
        verbosity: Verbosity::Quiet,
        color: ColorChoice::Never,
    })
}

/// Path of a program in [`BIN_DIR`].
pub fn bin(program: &str) -> String {
    format!("{}/{}", BIN_DIR, program)
}

/// Mock compiler outputs for testing identity probes.
pub mod compiler_outputs {
    use super::super::MockProcessOutput;

    /// GCC version output.
    pub fn gcc_version(version: &str) -> MockProcessOutput {
        MockProcessOutput::success(format!(
            "gcc (GCC) {version}\nCopyright (C) 2024 Free Software Foundation, Inc."
        ))
    }

    /// Clang version output.
    pub fn clang_version(version: &str) -> MockProcessOutput {
        MockProcessOutput::success(format!(
            "clang version {version}\nTarget: x86_64-unknown-linux-gnu"
        ))
    }

    /// gfortran version output.
    pub fn gfortran_version(version: &str) -> MockProcessOutput {
        MockProcessOutput::success(format!(
            "GNU Fortran (GCC) {version}\nCopyright (C) 2024 Free Software Foundation, Inc."
        ))
    }

    /// MSVC banner, printed on stderr when `cl` runs without arguments.
    pub fn msvc_banner() -> MockProcessOutput {
        MockProcessOutput::with_output(
            2,
            "",
            "Microsoft (R) C/C++ Optimizing Compiler Version 19.36.32532 for x64\nusage: cl [ option... ] filename... [ /link linkoption... ]",
        )
    }

    /// clang-cl version output.
    pub fn clang_cl_version(version: &str) -> MockProcessOutput {
        MockProcessOutput::success(format!(
            "clang version {version}\nTarget: x86_64-pc-windows-msvc\nThread model: posix"
        ))
    }
}
