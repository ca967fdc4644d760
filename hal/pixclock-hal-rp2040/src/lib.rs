//! RP2040-specific HAL for the desk clock firmware
//!
//! This crate provides RP2040 implementations of the shared
//! `pixclock-hal` traits:
//!
//! - Flash storage driver (implements `pixclock_hal::KeyValueStore`)

#![no_std]

pub mod flash;

// Re-export shared traits from pixclock-hal for convenience
pub use pixclock_hal::{KeyValueStore, Namespace, StorageKey};
