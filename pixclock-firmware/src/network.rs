//! Orchestrator-side handles to the radio task
//!
//! [`ChannelNetwork`] turns [`NetworkLink`] calls into queued
//! [`NetCommand`]s and [`SntpClock`] reads the result of the last SNTP
//! exchange. Neither blocks the clock loop.

use embassy_time::Instant;
use heapless::String;

use pixclock_core::config::HotspotConfig;
use pixclock_core::traits::{NetworkLink, TimeSource};
use pixclock_protocol::{NetworkCredentials, MAX_SSID_LEN};

use crate::channels::{NETWORK_TIME, NET_COMMANDS};

/// Work for the radio task
pub enum NetCommand {
    /// Join as a station, then request network time
    Station(NetworkCredentials),
    /// Start the setup access point
    Hotspot(HotspotConfig),
    /// Stop the setup access point
    StopHotspot,
    /// Leave any network and idle the radio
    Shutdown,
    /// Scan and look for this network name
    Scan(String<MAX_SSID_LEN>),
}

/// Reasons a radio request was not queued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetError {
    /// The radio task is behind by a full command queue
    QueueFull,
    /// Scan target longer than any valid network name
    SsidTooLong,
}

/// [`NetworkLink`] backed by the radio command channel
pub struct ChannelNetwork;

impl ChannelNetwork {
    fn queue(&mut self, command: NetCommand) -> Result<(), NetError> {
        NET_COMMANDS.try_send(command).map_err(|_| NetError::QueueFull)
    }
}

impl NetworkLink for ChannelNetwork {
    type Error = NetError;

    fn start_station(&mut self, credentials: &NetworkCredentials) -> Result<(), NetError> {
        // A new session must not report time fetched by an earlier one
        NETWORK_TIME.lock(|time| time.set(None));
        self.queue(NetCommand::Station(credentials.clone()))
    }

    fn start_hotspot(&mut self, hotspot: &HotspotConfig) -> Result<(), NetError> {
        self.queue(NetCommand::Hotspot(*hotspot))
    }

    fn stop_hotspot(&mut self) -> Result<(), NetError> {
        self.queue(NetCommand::StopHotspot)
    }

    fn shutdown(&mut self) -> Result<(), NetError> {
        self.queue(NetCommand::Shutdown)
    }

    fn scan(&mut self, target_ssid: &str) -> Result<(), NetError> {
        let mut ssid = String::new();
        ssid.push_str(target_ssid).map_err(|_| NetError::SsidTooLong)?;
        self.queue(NetCommand::Scan(ssid))
    }
}

/// [`TimeSource`] extrapolating the last SNTP answer with the uptime timer
pub struct SntpClock;

impl TimeSource for SntpClock {
    fn synced_unix(&mut self) -> Option<i64> {
        let (unix, received) = NETWORK_TIME.lock(|time| time.get())?;
        let elapsed = Instant::now().saturating_duration_since(received).as_secs();
        Some(unix + elapsed as i64)
    }
}

/// Record a fresh SNTP answer
pub fn publish_network_time(unix: i64) {
    NETWORK_TIME.lock(|time| time.set(Some((unix, Instant::now()))));
}
