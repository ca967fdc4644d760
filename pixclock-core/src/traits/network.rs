//! Network collaborator traits
//!
//! The radio runs in its own task. Requests made through [`NetworkLink`]
//! only queue work and return at once; outcomes come back later as
//! [`NetworkEvent`]s posted to the orchestrator.

use pixclock_protocol::NetworkCredentials;

use crate::config::HotspotConfig;

/// Why a station connection attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisconnectReason {
    /// The configured network was not seen
    NoApFound,
    /// The access point rejected the passphrase
    AuthFailed,
    /// Anything else (beacon loss, DHCP failure, ...)
    Other,
}

/// Notifications from the network task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NetworkEvent {
    /// Joined and acquired an address
    Connected,
    /// A join attempt failed or an established link dropped
    Disconnected(DisconnectReason),
    /// A requested scan finished
    ScanComplete {
        /// Networks seen
        networks: u8,
        /// Whether the configured network was among them
        target_seen: bool,
    },
}

/// Requests to the network task
pub trait NetworkLink {
    /// Error type when a request cannot be queued
    type Error;

    /// Begin joining a network as a station
    fn start_station(&mut self, credentials: &NetworkCredentials) -> Result<(), Self::Error>;

    /// Bring up the setup hotspot and its portal
    fn start_hotspot(&mut self, hotspot: &HotspotConfig) -> Result<(), Self::Error>;

    /// Take the setup hotspot down
    fn stop_hotspot(&mut self) -> Result<(), Self::Error>;

    /// Leave any network and power the radio down
    fn shutdown(&mut self) -> Result<(), Self::Error>;

    /// Scan for networks and report whether `target_ssid` is visible
    fn scan(&mut self, target_ssid: &str) -> Result<(), Self::Error>;
}

/// Network-backed clock
pub trait TimeSource {
    /// Current Unix time if the source has synced, `None` otherwise
    fn synced_unix(&mut self) -> Option<i64>;
}
