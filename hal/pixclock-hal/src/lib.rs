//! PIX Clock Hardware Abstraction Layer
//!
//! This crate defines the hardware abstraction traits the clock logic is
//! written against. Chip-specific crates implement them, and host tests
//! substitute simulated buses and stores.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (pixclock-firmware)        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  pixclock-core / pixclock-drivers       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  pixclock-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ pixclock-hal- │
//!             │    rp2040     │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`i2c::I2cBus`] - I2C bus operations
//! - [`storage::KeyValueStore`] - Persistent namespaced records

#![no_std]
#![deny(unsafe_code)]

pub mod i2c;
pub mod storage;

// Re-export key traits at crate root for convenience
pub use i2c::{EmbeddedHalI2c, I2cBus, I2cConfig};
pub use storage::{KeyValueStore, Namespace, StorageError, StorageKey};
