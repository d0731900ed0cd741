//! Toolchain probing.
//!
//! This module implements the configure-time discovery of a compiler
//! toolchain:
//! - Locating programs through overrides, cached paths, the system path
//!   and the Windows install registry
//! - Trying candidate toolchains in order with rollback on failure
//! - Assembling secondary tools and flags for the committed toolchain

pub mod auxiliary;
pub mod errors;
pub mod flags;
pub mod loader;
pub mod loaders;
pub mod locator;
pub mod registry;
pub mod selector;

pub use auxiliary::AuxiliaryReport;
pub use errors::ConfigureError;
pub use flags::{FlagContext, FlagPipeline, FlagStep, FnStep};
pub use loader::{Host, LoaderRegistry, ProbeContext, ProbeOutcome, ToolchainLoader};
pub use locator::{Located, ToolLocator};
pub use registry::CandidateRegistry;
pub use selector::{ProbeReport, Selection, ToolchainSelector, Verdict};
