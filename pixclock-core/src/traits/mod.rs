//! Collaborator traits
//!
//! These traits define the interface between the clock logic and the
//! hardware drivers and network stack. Host tests implement them with
//! simulated devices.

pub mod display;
pub mod network;
pub mod rtc;

pub use display::ClockDisplay;
pub use network::{DisconnectReason, NetworkEvent, NetworkLink, TimeSource};
pub use rtc::RealTimeClock;
