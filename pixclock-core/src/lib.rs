//! Board-agnostic core logic for the PIX desk clock firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Collaborator traits (RTC, display, network link, time source)
//! - Calendar arithmetic and the wall-clock reading type
//! - Clock face text, burn-in offset and contrast rules
//! - Mode state machine and the orchestrator that drives it
//! - Sync scheduling, join retry tracking and settings persistence
//! - Configuration type definitions

#![no_std]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod config;
pub mod face;
pub mod orchestrator;
pub mod retry;
pub mod settings;
pub mod state;
pub mod sync;
pub mod time;
pub mod traits;

#[cfg(test)]
mod testing;

pub use orchestrator::{ConnectPhase, Orchestrator};
pub use state::{Mode, ModeEvent};
