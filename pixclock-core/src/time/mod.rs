//! Calendar time handling
//!
//! [`WallClock`] mirrors the RTC's register fields; [`calendar`] converts
//! between civil dates and Unix day counts.

pub mod calendar;
pub mod wallclock;

pub use wallclock::{TimeError, WallClock, WEEKDAY_NAMES};
