//! Wall-clock time as held by the real-time clock chip
//!
//! The weekday is stored independently of the date, exactly like the RTC
//! registers. Nothing here derives it implicitly except [`WallClock::from_unix`],
//! whose input is an absolute timestamp.

use core::fmt::Write;

use heapless::String;

use super::calendar::{civil_from_days, days_from_civil, days_in_month, weekday_from_days, SECONDS_PER_DAY};

/// Three-letter weekday names, index = weekday - 1 (1 = Sunday)
pub const WEEKDAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Errors from wall-clock validation and formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeError {
    /// Weekday outside 1-7
    InvalidWeekday,
    /// Some other field outside its documented range
    OutOfRange,
}

/// Calendar time with the RTC's field ranges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WallClock {
    /// 0-59
    pub seconds: u8,
    /// 0-59
    pub minutes: u8,
    /// 0-23
    pub hours: u8,
    /// 1-7, 1 = Sunday
    pub weekday: u8,
    /// 1-31
    pub day: u8,
    /// 1-12
    pub month: u8,
    /// 0-99, meaning 2000-2099
    pub year: u8,
}

impl WallClock {
    /// Check every field against its range, including the month length
    pub fn validate(&self) -> Result<(), TimeError> {
        if !(1..=7).contains(&self.weekday) {
            return Err(TimeError::InvalidWeekday);
        }
        let in_range = self.seconds < 60
            && self.minutes < 60
            && self.hours < 24
            && (1..=12).contains(&self.month)
            && self.year < 100
            && self.day >= 1
            && self.day <= days_in_month(self.full_year(), self.month);
        if in_range {
            Ok(())
        } else {
            Err(TimeError::OutOfRange)
        }
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Four-digit year
    pub fn full_year(&self) -> u16 {
        2000 + self.year as u16
    }

    /// Abbreviated weekday name
    pub fn weekday_name(&self) -> Result<&'static str, TimeError> {
        (self.weekday as usize)
            .checked_sub(1)
            .and_then(|i| WEEKDAY_NAMES.get(i))
            .copied()
            .ok_or(TimeError::InvalidWeekday)
    }

    /// `"<Wd> YYYY-MM-DD HH:MM:SS"`
    pub fn format(&self) -> Result<String<23>, TimeError> {
        let name = self.weekday_name()?;
        let mut out = String::new();
        write!(
            out,
            "{} {:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            name,
            self.full_year(),
            self.month,
            self.day,
            self.hours,
            self.minutes,
            self.seconds
        )
        .map_err(|_| TimeError::OutOfRange)?;
        Ok(out)
    }

    /// Local wall-clock time for a Unix timestamp at a fixed UTC offset
    ///
    /// The weekday is computed from the date. Fails for instants outside
    /// 2000-2099 local time.
    pub fn from_unix(unix: i64, utc_offset_secs: i32) -> Result<Self, TimeError> {
        let local = unix + utc_offset_secs as i64;
        let days = local.div_euclid(SECONDS_PER_DAY);
        let secs = local.rem_euclid(SECONDS_PER_DAY);
        let (year, month, day) = civil_from_days(days);
        if !(2000..=2099).contains(&year) {
            return Err(TimeError::OutOfRange);
        }
        Ok(Self {
            seconds: (secs % 60) as u8,
            minutes: ((secs / 60) % 60) as u8,
            hours: (secs / 3600) as u8,
            weekday: weekday_from_days(days),
            day,
            month,
            year: (year - 2000) as u8,
        })
    }

    /// Unix timestamp for this time read as local time at a fixed UTC offset
    ///
    /// Only an approximation of absolute time: it trusts the chip's own
    /// drift and ignores the weekday field.
    pub fn to_unix(&self, utc_offset_secs: i32) -> Result<i64, TimeError> {
        match self.validate() {
            Ok(()) | Err(TimeError::InvalidWeekday) => {}
            Err(e) => return Err(e),
        }
        let days = days_from_civil(self.full_year() as i32, self.month, self.day);
        let local = days * SECONDS_PER_DAY
            + self.hours as i64 * 3600
            + self.minutes as i64 * 60
            + self.seconds as i64;
        Ok(local - utc_offset_secs as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UTC8: i32 = 8 * 3600;

    fn sample() -> WallClock {
        WallClock {
            seconds: 56,
            minutes: 34,
            hours: 12,
            weekday: 4,
            day: 15,
            month: 1,
            year: 25,
        }
    }

    #[test]
    fn test_format() {
        assert_eq!(sample().format().unwrap().as_str(), "Wed 2025-01-15 12:34:56");
    }

    #[test]
    fn test_format_rejects_bad_weekday() {
        for weekday in [0, 8, 255] {
            let time = WallClock { weekday, ..sample() };
            assert_eq!(time.format(), Err(TimeError::InvalidWeekday));
            assert_eq!(time.weekday_name(), Err(TimeError::InvalidWeekday));
        }
    }

    #[test]
    fn test_validate() {
        assert!(sample().is_valid());
        assert_eq!(
            WallClock { day: 30, month: 2, ..sample() }.validate(),
            Err(TimeError::OutOfRange)
        );
        assert_eq!(
            WallClock { hours: 24, ..sample() }.validate(),
            Err(TimeError::OutOfRange)
        );
        assert_eq!(
            WallClock { year: 100, ..sample() }.validate(),
            Err(TimeError::OutOfRange)
        );
    }

    #[test]
    fn test_from_unix_applies_offset() {
        // 2025-01-15 04:34:56 UTC
        let unix = 1_736_915_696;
        let local = WallClock::from_unix(unix, UTC8).unwrap();
        assert_eq!(local, sample());
        assert_eq!(local.to_unix(UTC8).unwrap(), unix);
    }

    #[test]
    fn test_from_unix_crosses_midnight() {
        // 2024-12-31 20:00:00 UTC is 2025-01-01 04:00 at UTC+8, a Wednesday
        let local = WallClock::from_unix(1_735_675_200, UTC8).unwrap();
        assert_eq!((local.year, local.month, local.day), (25, 1, 1));
        assert_eq!(local.hours, 4);
        assert_eq!(local.weekday, 4);
    }

    #[test]
    fn test_from_unix_out_of_range() {
        assert_eq!(WallClock::from_unix(0, 0), Err(TimeError::OutOfRange));
    }

    #[test]
    fn test_to_unix_ignores_weekday() {
        let time = WallClock { weekday: 0, ..sample() };
        assert_eq!(time.to_unix(UTC8), sample().to_unix(UTC8));
    }
}
