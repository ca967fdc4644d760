//! Configuration type definitions
//!
//! All values are compile-time defaults; nothing here is user-editable at
//! runtime. The firmware builds [`ClockConfig::default()`] once at boot.

/// Timing and policy for the clock loop and the sync session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockConfig {
    /// Clock loop period
    pub tick_ms: u32,
    /// Hours between network time syncs
    pub sync_interval_hours: u32,
    /// Fixed local offset from UTC, in seconds
    pub utc_offset_secs: i32,
    /// Deadline for a single station join attempt
    pub join_timeout_ms: u32,
    /// Radio-side limit on association plus DHCP, below `join_timeout_ms`
    pub radio_join_budget_ms: u32,
    /// Join retries after the first attempt before credentials are dropped
    pub join_retries: u8,
    /// Wait between join attempts
    pub join_backoff_ms: u32,
    /// How often the time source is polled once an address is acquired
    pub sync_poll_ms: u32,
    /// Overall budget for the time source to report a synced clock
    pub sync_timeout_ms: u32,
    /// How often stored credentials are checked while provisioning
    pub provision_poll_ms: u32,
    /// Display contrast during the day
    pub day_contrast: u8,
    /// Display contrast between `night_start_hour` and `night_end_hour`
    pub night_contrast: u8,
    /// First hour of reduced contrast
    pub night_start_hour: u8,
    /// First hour of full contrast again
    pub night_end_hour: u8,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            tick_ms: 1_000,
            sync_interval_hours: 720,
            utc_offset_secs: 8 * 3600,
            join_timeout_ms: 30_000,
            radio_join_budget_ms: 20_000,
            join_retries: 5,
            join_backoff_ms: 15_000,
            sync_poll_ms: 5_000,
            sync_timeout_ms: 60_000,
            provision_poll_ms: 2_000,
            day_contrast: 0xCF,
            night_contrast: 0x9B,
            night_start_hour: 18,
            night_end_hour: 6,
        }
    }
}

impl ClockConfig {
    /// Resync interval in seconds
    pub fn sync_interval_secs(&self) -> i64 {
        self.sync_interval_hours as i64 * 3600
    }
}

/// Identity of the setup hotspot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HotspotConfig {
    pub ssid: &'static str,
    pub passphrase: &'static str,
    pub channel: u8,
}

impl HotspotConfig {
    /// Clients the setup hotspot hands addresses to
    pub const MAX_CLIENTS: usize = 4;
}

impl Default for HotspotConfig {
    fn default() -> Self {
        Self {
            ssid: "PIX_Clock_Setup",
            passphrase: "12345678",
            channel: 1,
        }
    }
}
