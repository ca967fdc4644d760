//! Mode definition
//!
//! All radio activity is a function of the current mode. The RTC is read
//! and the face redrawn every tick in every mode.

use super::events::ModeEvent;

/// Clock modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Power-on; nothing decided yet
    Unprovisioned,
    /// Setup hotspot up, waiting for credentials
    Provisioning,
    /// Station join and time sync in progress
    ConnectingForSync,
    /// Sync session over, network down for the rest of this boot
    SyncedIdle,
    /// Sync was not due, network never brought up this boot
    LocalClockOnly,
}

impl Mode {
    /// Process an event and return the next mode
    pub fn transition(self, event: ModeEvent) -> Self {
        use Mode::*;
        use ModeEvent::*;

        match (self, event) {
            // Boot decisions
            (Unprovisioned, HotspotStarted) => Provisioning,
            (Unprovisioned, SyncDue) => ConnectingForSync,
            (Unprovisioned, SyncNotDue) => LocalClockOnly,

            // Provisioning transitions
            (Provisioning, CredentialsFound) => ConnectingForSync,

            // Sync session transitions
            (ConnectingForSync, JoinExhausted) => Provisioning,
            (ConnectingForSync, SyncSucceeded) => SyncedIdle,
            (ConnectingForSync, SyncTimedOut) => SyncedIdle,

            // Default: stay in current mode
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boot_without_credentials() {
        let mode = Mode::Unprovisioned.transition(ModeEvent::HotspotStarted);
        assert_eq!(mode, Mode::Provisioning);
    }

    #[test]
    fn test_boot_with_credentials() {
        assert_eq!(
            Mode::Unprovisioned.transition(ModeEvent::SyncDue),
            Mode::ConnectingForSync
        );
        assert_eq!(
            Mode::Unprovisioned.transition(ModeEvent::SyncNotDue),
            Mode::LocalClockOnly
        );
    }

    #[test]
    fn test_provisioning_flow() {
        let connecting = Mode::Provisioning.transition(ModeEvent::CredentialsFound);
        assert_eq!(connecting, Mode::ConnectingForSync);

        // Bad credentials send it back
        let provisioning = connecting.transition(ModeEvent::JoinExhausted);
        assert_eq!(provisioning, Mode::Provisioning);
    }

    #[test]
    fn test_sync_outcomes_are_idle() {
        for event in [ModeEvent::SyncSucceeded, ModeEvent::SyncTimedOut] {
            let next = Mode::ConnectingForSync.transition(event);
            assert_eq!(next, Mode::SyncedIdle);
        }
    }

    #[test]
    fn test_terminal_modes_ignore_events() {
        let events = [
            ModeEvent::HotspotStarted,
            ModeEvent::SyncDue,
            ModeEvent::CredentialsFound,
            ModeEvent::JoinExhausted,
            ModeEvent::SyncSucceeded,
        ];
        for mode in [Mode::SyncedIdle, Mode::LocalClockOnly] {
            for event in events {
                assert_eq!(mode.transition(event), mode);
            }
        }
    }
}
