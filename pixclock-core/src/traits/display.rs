//! Clock display trait

/// Panel that renders the clock face
///
/// Every call that changes the panel performs its own bus transfer; a
/// returned error means the refresh did not complete and may be retried
/// on the next tick.
pub trait ClockDisplay {
    /// Error type for display operations
    type Error;

    /// Draw the full clock face
    ///
    /// - `offset_x`, `offset_y`: burn-in shift in pixels, clamped to ±2
    fn show_clock(
        &mut self,
        time: &str,
        date: &str,
        weekday: &str,
        temperature: &str,
        offset_x: i8,
        offset_y: i8,
    ) -> Result<(), Self::Error>;

    /// Draw only a centred time string, used when the RTC cannot be read
    fn show_time(&mut self, time: &str) -> Result<(), Self::Error>;

    /// Set panel contrast. Implementations skip the write when unchanged.
    fn set_contrast(&mut self, contrast: u8) -> Result<(), Self::Error>;
}
