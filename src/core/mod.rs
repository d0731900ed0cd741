//! Core data structures for berth.
//!
//! This module contains the foundational types shared by every stage:
//! - The configuration environment and its key schema
//! - Host platform and language identifiers
//! - Caller-supplied overrides
//! - Tool descriptors and search sources

pub mod environment;
pub mod key;
pub mod language;
pub mod overrides;
pub mod platform;
pub mod tool;

pub use environment::{EnvDelta, Environment, Snapshot, Value};
pub use key::Key;
pub use language::{Language, ToolchainFamily};
pub use overrides::Overrides;
pub use platform::PlatformKey;
pub use tool::{RegistryQuery, Requirement, SearchSources, ToolDescriptor};
