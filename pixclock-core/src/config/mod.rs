//! Configuration types
//!
//! Fixed timing, policy and identity constants for the clock.

pub mod types;

pub use types::*;
