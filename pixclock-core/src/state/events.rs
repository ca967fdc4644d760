//! Events that trigger mode transitions

/// Events that can trigger mode transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModeEvent {
    // Boot decisions
    /// No credentials stored; the setup hotspot is up
    HotspotStarted,
    /// Credentials stored and a sync is due
    SyncDue,
    /// Credentials stored and the last sync is recent enough
    SyncNotDue,

    // Provisioning
    /// New credentials were found in storage
    CredentialsFound,

    // Sync session
    /// Every join attempt failed; credentials were dropped
    JoinExhausted,
    /// Network time was written to the RTC
    SyncSucceeded,
    /// The time source never reported a synced clock
    SyncTimedOut,
}
