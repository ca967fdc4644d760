//! Sync scheduling policy
//!
//! Decides whether this boot should bring the network up purely to correct
//! RTC drift, and whether a time reported by the network is believable.

use crate::config::ClockConfig;
use crate::time::calendar::{days_from_civil, SECONDS_PER_DAY};

/// Whether enough time has passed since the last sync
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SyncPolicy {
    interval_secs: i64,
}

impl SyncPolicy {
    pub const fn new(interval_secs: i64) -> Self {
        Self { interval_secs }
    }

    pub fn from_config(config: &ClockConfig) -> Self {
        Self::new(config.sync_interval_secs())
    }

    /// Sync-due decision
    ///
    /// Due when forced, when no sync was ever recorded, when the current
    /// time is unknown, when the clock is behind the record, or when at
    /// least the interval has elapsed.
    pub fn is_due(&self, last_sync: Option<i64>, now: Option<i64>, force: bool) -> bool {
        if force {
            return true;
        }
        match (last_sync, now) {
            (Some(last), Some(now)) => {
                let elapsed = now - last;
                elapsed < 0 || elapsed >= self.interval_secs
            }
            _ => true,
        }
    }
}

/// Check a Unix timestamp lies in 2020-2099 (UTC)
///
/// An unsynced network clock reports times near the epoch; anything
/// outside this window is treated as "not synced yet".
pub fn is_plausible(unix: i64) -> bool {
    let start = days_from_civil(2020, 1, 1) * SECONDS_PER_DAY;
    let end = days_from_civil(2100, 1, 1) * SECONDS_PER_DAY;
    (start..end).contains(&unix)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: i64 = 3600;
    const NOW: i64 = 1_750_000_000;

    fn policy() -> SyncPolicy {
        SyncPolicy::from_config(&ClockConfig::default())
    }

    #[test]
    fn test_due_without_record() {
        assert!(policy().is_due(None, Some(NOW), false));
    }

    #[test]
    fn test_due_at_interval_boundary() {
        assert!(policy().is_due(Some(NOW - 720 * HOUR), Some(NOW), false));
        assert!(!policy().is_due(Some(NOW - 719 * HOUR), Some(NOW), false));
    }

    #[test]
    fn test_due_when_clock_went_backwards() {
        assert!(policy().is_due(Some(NOW + HOUR), Some(NOW), false));
    }

    #[test]
    fn test_due_when_now_unknown() {
        assert!(policy().is_due(Some(NOW), None, false));
    }

    #[test]
    fn test_force_overrides_recent_sync() {
        assert!(policy().is_due(Some(NOW - HOUR), Some(NOW), true));
    }

    #[test]
    fn test_plausible_window() {
        assert!(!is_plausible(0));
        assert!(!is_plausible(1_577_836_799)); // 2019-12-31 23:59:59
        assert!(is_plausible(1_577_836_800)); // 2020-01-01
        assert!(is_plausible(NOW));
        assert!(!is_plausible(4_102_444_800)); // 2100-01-01
    }
}
