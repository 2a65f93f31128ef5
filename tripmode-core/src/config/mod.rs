//! Configuration types
//!
//! Board-agnostic controller settings. Loading them from a file is left to
//! the host.

pub mod types;

pub use types::*;
