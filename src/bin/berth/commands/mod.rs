//! Command implementations

pub mod candidates;
pub mod completions;
pub mod configure;
pub mod env;
