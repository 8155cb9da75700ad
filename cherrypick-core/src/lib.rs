//! Selection and navigation model for the cherrypick terminal UI.
//!
//! Everything here is terminal-agnostic: the binary crate owns rendering and
//! key routing, and drives these types from its event loop. Version control
//! is reached only through the capability traits in [`vcs`]; [`git::GitCli`]
//! is the production implementation.

pub mod config;
pub mod conflict;
pub mod error;
pub mod git;
pub mod loader;
pub mod preview;
pub mod range;
pub mod search;
pub mod store;
pub mod switch;
pub mod types;
pub mod vcs;
pub mod view;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;
