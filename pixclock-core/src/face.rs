//! Clock face text and presentation rules
//!
//! Turns an RTC reading into the four strings the display draws, plus the
//! burn-in offset and the day/night contrast level.

use core::fmt::Write;

use heapless::String;

use crate::config::ClockConfig;
use crate::time::WallClock;

/// Shown instead of the temperature when the sensor read fails
pub const TEMPERATURE_PLACEHOLDER: &str = "---c";

/// Shown instead of the weekday when the RTC field is out of range
pub const WEEKDAY_PLACEHOLDER: &str = "---";

/// Shown by the time-only face before the RTC was ever read
pub const TIME_PLACEHOLDER: &str = "--:--";

/// Burn-in offsets: centre, then clockwise around the centre pixel
pub const BURN_IN_OFFSETS: [(i8, i8); 8] = [
    (0, 0),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
];

/// `HH:MM`, with a space for the colon on odd seconds
pub fn time_text(time: &WallClock) -> String<5> {
    let separator = if time.seconds % 2 == 0 { ':' } else { ' ' };
    let mut out = String::new();
    let _ = write!(out, "{:02}{}{:02}", time.hours, separator, time.minutes);
    out
}

/// `YYYY-MM-DD`
pub fn date_text(time: &WallClock) -> String<10> {
    let mut out = String::new();
    let _ = write!(
        out,
        "{:04}-{:02}-{:02}",
        time.full_year(),
        time.month,
        time.day
    );
    out
}

/// Weekday abbreviation, or a placeholder when the field is out of range
pub fn weekday_text(time: &WallClock) -> &'static str {
    time.weekday_name().unwrap_or(WEEKDAY_PLACEHOLDER)
}

/// Celsius with one decimal and a `c` suffix
pub fn temperature_text(celsius: Option<f32>) -> String<8> {
    let mut out = String::new();
    match celsius {
        Some(value) => {
            if write!(out, "{:.1}c", value).is_err() {
                out.clear();
                let _ = out.push_str(TEMPERATURE_PLACEHOLDER);
            }
        }
        None => {
            let _ = out.push_str(TEMPERATURE_PLACEHOLDER);
        }
    }
    out
}

/// Burn-in offset for a minute of the hour, advancing every 5 minutes
pub fn burn_in_offset(minutes: u8) -> (i8, i8) {
    BURN_IN_OFFSETS[(minutes as usize / 5) % BURN_IN_OFFSETS.len()]
}

/// Reduced contrast from the night start hour until the night end hour
pub fn contrast_for_hour(hour: u8, config: &ClockConfig) -> u8 {
    let night = if config.night_start_hour > config.night_end_hour {
        hour >= config.night_start_hour || hour < config.night_end_hour
    } else {
        hour >= config.night_start_hour && hour < config.night_end_hour
    };
    if night {
        config.night_contrast
    } else {
        config.day_contrast
    }
}

/// Everything the display needs for one clock-face refresh
#[derive(Debug, Clone, PartialEq)]
pub struct ClockFace {
    pub time: String<5>,
    pub date: String<10>,
    pub weekday: &'static str,
    pub temperature: String<8>,
    pub offset: (i8, i8),
    pub contrast: u8,
}

impl ClockFace {
    pub fn compose(time: &WallClock, celsius: Option<f32>, config: &ClockConfig) -> Self {
        Self {
            time: time_text(time),
            date: date_text(time),
            weekday: weekday_text(time),
            temperature: temperature_text(celsius),
            offset: burn_in_offset(time.minutes),
            contrast: contrast_for_hour(time.hours, config),
        }
    }
}
