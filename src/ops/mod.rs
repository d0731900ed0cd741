//! High-level operations.
//!
//! This module contains the implementation of berth commands.

pub mod configure;

pub use configure::{configure, ConfigureOptions, ConfigureReport, Configurator};
