//! Real-time clock trait

use crate::time::WallClock;

/// Battery-backed clock chip
///
/// Calls are blocking bus transactions. A failed call leaves no partial
/// state behind; the caller simply tries again on the next tick.
pub trait RealTimeClock {
    /// Error type for RTC operations
    type Error;

    /// Read the current wall-clock time
    fn read_time(&mut self) -> Result<WallClock, Self::Error>;

    /// Set the wall-clock time, weekday included as given
    fn write_time(&mut self, time: &WallClock) -> Result<(), Self::Error>;

    /// Read the die temperature in degrees Celsius
    fn read_temperature(&mut self) -> Result<f32, Self::Error>;
}
