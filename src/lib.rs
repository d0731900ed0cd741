//! Berth - compiler toolchain detection for native builds
//!
//! This crate probes candidate compilers for C, C++ and Fortran, commits the
//! first one that works into a shared build environment, and then locates
//! the archiver and other secondary tools and assembles the flags a build
//! needs.

pub mod core;
pub mod ops;
pub mod probe;
pub mod util;

/// Test utilities and mocks for berth unit tests.
///
/// This module is only available when compiling with `--cfg test`. It
/// provides mock program lookup, registry queries and process execution.
#[cfg(test)]
pub mod test_support;

pub use core::{Environment, Key, Language, Overrides, PlatformKey};
pub use ops::{configure, ConfigureOptions, ConfigureReport, Configurator};
pub use probe::{ConfigureError, Host};
