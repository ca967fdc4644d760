//! Clock and sync orchestrator
//!
//! Owns the RTC, the display, the settings store and the handles to the
//! network task. It runs from one periodic loop: [`Orchestrator::tick`]
//! redraws the face, drains queued network events and services the
//! provisioning, join and sync timers. Network notifications arriving from
//! other tasks only go through [`Orchestrator::post`].

use heapless::{Deque, String};
use pixclock_hal::KeyValueStore;
use pixclock_protocol::NetworkCredentials;

use crate::config::{ClockConfig, HotspotConfig};
use crate::face::{time_text, ClockFace, TIME_PLACEHOLDER};
use crate::retry::{RetryPolicy, RetryStep, RetryTracker};
use crate::settings::{Settings, SettingsError};
use crate::state::{Mode, ModeEvent};
use crate::sync::{is_plausible, SyncPolicy};
use crate::time::WallClock;
use crate::traits::{ClockDisplay, DisconnectReason, NetworkEvent, NetworkLink, RealTimeClock, TimeSource};

/// Network events buffered between ticks
pub const EVENT_QUEUE_SIZE: usize = 8;

/// Progress of the sync session while in [`Mode::ConnectingForSync`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectPhase {
    /// Join requested, waiting for an address
    Joining { started_ms: u64 },
    /// Previous attempt failed, waiting before the next one
    Backoff { retry_at_ms: u64 },
    /// Address acquired, polling the time source
    Syncing { started_ms: u64, next_poll_ms: u64 },
}

/// Link change the network task has not accepted yet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum LinkRequest {
    Hotspot,
    Shutdown,
}

/// Clock loop state and collaborators
pub struct Orchestrator<R, D, S, N, T> {
    rtc: R,
    display: D,
    settings: Settings<S>,
    network: N,
    time_source: T,
    config: ClockConfig,
    hotspot: HotspotConfig,
    policy: SyncPolicy,
    mode: Mode,
    phase: Option<ConnectPhase>,
    retries: RetryTracker,
    credentials: Option<NetworkCredentials>,
    /// Reissued every tick until the network task takes it
    pending_link: Option<LinkRequest>,
    events: Deque<NetworkEvent, EVENT_QUEUE_SIZE>,
    force_sync: bool,
    scan_requested: bool,
    next_provision_poll_ms: u64,
    /// Last good RTC reading and when it was taken
    last_reading: Option<(WallClock, u64)>,
}

impl<R, D, S, N, T> Orchestrator<R, D, S, N, T>
where
    R: RealTimeClock,
    D: ClockDisplay,
    S: KeyValueStore,
    N: NetworkLink,
    T: TimeSource,
{
    pub fn new(rtc: R, display: D, store: S, network: N, time_source: T, config: ClockConfig) -> Self {
        Self {
            rtc,
            display,
            settings: Settings::new(store),
            network,
            time_source,
            policy: SyncPolicy::from_config(&config),
            retries: Self::join_policy(&config).tracker(),
            config,
            hotspot: HotspotConfig::default(),
            mode: Mode::Unprovisioned,
            phase: None,
            credentials: None,
            pending_link: None,
            events: Deque::new(),
            force_sync: false,
            scan_requested: false,
            next_provision_poll_ms: 0,
            last_reading: None,
        }
    }

    fn join_policy(config: &ClockConfig) -> RetryPolicy {
        RetryPolicy::new(config.join_retries.saturating_add(1), config.join_backoff_ms)
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn phase(&self) -> Option<ConnectPhase> {
        self.phase
    }

    pub fn rtc(&self) -> &R {
        &self.rtc
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn network(&self) -> &N {
        &self.network
    }

    pub fn time_source_mut(&mut self) -> &mut T {
        &mut self.time_source
    }

    pub fn settings(&mut self) -> &mut Settings<S> {
        &mut self.settings
    }

    /// Make the next sync-due evaluation return "due"
    pub fn request_force_sync(&mut self) {
        self.force_sync = true;
    }

    /// Queue a network notification for the next tick
    ///
    /// Returns the event back when the queue is full.
    pub fn post(&mut self, event: NetworkEvent) -> Result<(), NetworkEvent> {
        self.events.push_back(event)
    }

    /// Persist credentials submitted through the setup portal
    ///
    /// The provisioning poll picks them up on its next run.
    pub fn submit_credentials(&mut self, credentials: &NetworkCredentials) -> Result<(), SettingsError> {
        self.settings.save_credentials(credentials)?;
        info!("Credentials saved");
        Ok(())
    }

    /// Decide the boot mode
    pub fn boot(&mut self, now_ms: u64) {
        let credentials = match self.settings.load_credentials() {
            Ok(credentials) => credentials,
            Err(_) => {
                warn!("Stored credentials unreadable, treating as unprovisioned");
                None
            }
        };

        match credentials {
            None => {
                info!("No credentials stored");
                self.enter_provisioning(now_ms, ModeEvent::HotspotStarted);
            }
            Some(credentials) => {
                if self.sync_due() {
                    info!("Sync due, joining network");
                    self.begin_session(credentials, now_ms);
                    self.apply(ModeEvent::SyncDue);
                } else {
                    info!("Sync not due, running on the RTC");
                    self.apply(ModeEvent::SyncNotDue);
                }
            }
        }
    }

    /// One pass of the clock loop
    pub fn tick(&mut self, now_ms: u64) {
        self.refresh_face(now_ms);
        while let Some(event) = self.events.pop_front() {
            self.handle_network_event(event, now_ms);
        }
        if let Some(request) = self.pending_link {
            self.send_link_request(request);
        }
        self.service_timers(now_ms);
    }

    fn apply(&mut self, event: ModeEvent) {
        let next = self.mode.transition(event);
        if next != self.mode {
            info!("Mode {:?} -> {:?}", self.mode, next);
        }
        self.mode = next;
    }

    /// Current time for the sync-due comparison
    ///
    /// Prefers the network clock; otherwise reads the RTC as local time at
    /// the configured offset.
    fn current_unix(&mut self) -> Option<i64> {
        if let Some(unix) = self.time_source.synced_unix().filter(|t| is_plausible(*t)) {
            return Some(unix);
        }
        let time = self.rtc.read_time().ok()?;
        time.to_unix(self.config.utc_offset_secs).ok()
    }

    fn sync_due(&mut self) -> bool {
        let last_sync = match self.settings.load_last_sync() {
            Ok(last) => last,
            Err(_) => {
                warn!("Sync record unreadable");
                None
            }
        };
        let now = self.current_unix();
        let force = core::mem::take(&mut self.force_sync);
        self.policy.is_due(last_sync, now, force)
    }

    /// Ask for a hotspot or shutdown, replacing any request still pending
    fn send_link_request(&mut self, request: LinkRequest) {
        let sent = match request {
            LinkRequest::Hotspot => self.network.start_hotspot(&self.hotspot).is_ok(),
            LinkRequest::Shutdown => self.network.shutdown().is_ok(),
        };
        if sent {
            self.pending_link = None;
        } else {
            warn!("{:?} request not queued, retrying next tick", request);
            self.pending_link = Some(request);
        }
    }

    fn enter_provisioning(&mut self, now_ms: u64, event: ModeEvent) {
        self.send_link_request(LinkRequest::Hotspot);
        self.next_provision_poll_ms = now_ms + self.config.provision_poll_ms as u64;
        self.apply(event);
    }

    fn begin_session(&mut self, credentials: NetworkCredentials, now_ms: u64) {
        self.retries = Self::join_policy(&self.config).tracker();
        self.scan_requested = false;
        self.pending_link = None;
        self.request_join(&credentials, now_ms);
        self.credentials = Some(credentials);
    }

    fn request_join(&mut self, credentials: &NetworkCredentials, now_ms: u64) {
        info!("Join attempt {}", self.retries.attempt());
        if self.network.start_station(credentials).is_err() {
            warn!("Join request not queued");
        }
        self.phase = Some(ConnectPhase::Joining { started_ms: now_ms });
    }

    fn end_session(&mut self) {
        self.send_link_request(LinkRequest::Shutdown);
        self.phase = None;
        self.credentials = None;
    }

    fn handle_network_event(&mut self, event: NetworkEvent, now_ms: u64) {
        match event {
            NetworkEvent::ScanComplete {
                networks,
                target_seen,
            } => {
                info!("Scan saw {} networks, target visible: {}", networks, target_seen);
            }
            _ if self.mode != Mode::ConnectingForSync => {
                debug!("Ignoring {:?} in {:?}", event, self.mode);
            }
            NetworkEvent::Connected => {
                if let Some(ConnectPhase::Joining { .. }) = self.phase {
                    info!("Address acquired, waiting for network time");
                    self.phase = Some(ConnectPhase::Syncing {
                        started_ms: now_ms,
                        next_poll_ms: now_ms,
                    });
                }
            }
            NetworkEvent::Disconnected(reason) => match self.phase {
                Some(ConnectPhase::Joining { .. }) | Some(ConnectPhase::Syncing { .. }) => {
                    warn!("Disconnected: {:?}", reason);
                    if reason == DisconnectReason::NoApFound
                        && self.retries.failures() == 0
                        && !self.scan_requested
                    {
                        self.request_scan();
                    }
                    self.join_failed(now_ms);
                }
                _ => {}
            },
        }
    }

    fn request_scan(&mut self) {
        if let Some(credentials) = &self.credentials {
            if self.network.scan(&credentials.ssid).is_err() {
                warn!("Scan request not queued");
            }
            self.scan_requested = true;
        }
    }

    fn join_failed(&mut self, now_ms: u64) {
        match self.retries.record_failure(now_ms) {
            RetryStep::RetryAt(retry_at_ms) => {
                self.phase = Some(ConnectPhase::Backoff { retry_at_ms });
            }
            RetryStep::Exhausted => {
                warn!("Join failed {} times, dropping credentials", self.retries.failures());
                if self.settings.clear_credentials().is_err() {
                    warn!("Failed to clear credentials");
                }
                self.end_session();
                self.enter_provisioning(now_ms, ModeEvent::JoinExhausted);
            }
        }
    }

    fn service_timers(&mut self, now_ms: u64) {
        match self.mode {
            Mode::Provisioning => self.poll_credentials(now_ms),
            Mode::ConnectingForSync => self.service_session(now_ms),
            _ => {}
        }
    }

    fn poll_credentials(&mut self, now_ms: u64) {
        if now_ms < self.next_provision_poll_ms {
            return;
        }
        self.next_provision_poll_ms = now_ms + self.config.provision_poll_ms as u64;

        if let Ok(Some(credentials)) = self.settings.load_credentials() {
            info!("Credentials received, leaving setup hotspot");
            if self.network.stop_hotspot().is_err() {
                warn!("Hotspot stop request not queued");
            }
            self.begin_session(credentials, now_ms);
            self.apply(ModeEvent::CredentialsFound);
        }
    }

    fn service_session(&mut self, now_ms: u64) {
        match self.phase {
            Some(ConnectPhase::Joining { started_ms }) => {
                if now_ms.saturating_sub(started_ms) >= self.config.join_timeout_ms as u64 {
                    warn!("Join attempt timed out");
                    self.join_failed(now_ms);
                }
            }
            Some(ConnectPhase::Backoff { retry_at_ms }) => {
                if now_ms >= retry_at_ms {
                    if let Some(credentials) = self.credentials.take() {
                        self.request_join(&credentials, now_ms);
                        self.credentials = Some(credentials);
                    }
                }
            }
            Some(ConnectPhase::Syncing {
                started_ms,
                next_poll_ms,
            }) => {
                if now_ms < next_poll_ms {
                    return;
                }
                if let Some(unix) = self.time_source.synced_unix().filter(|t| is_plausible(*t)) {
                    self.finish_sync(unix);
                } else if now_ms.saturating_sub(started_ms) >= self.config.sync_timeout_ms as u64 {
                    warn!("Network time not available, deferring sync");
                    self.end_session();
                    self.apply(ModeEvent::SyncTimedOut);
                } else {
                    self.phase = Some(ConnectPhase::Syncing {
                        started_ms,
                        next_poll_ms: now_ms + self.config.sync_poll_ms as u64,
                    });
                }
            }
            None => {}
        }
    }

    fn finish_sync(&mut self, unix: i64) {
        match WallClock::from_unix(unix, self.config.utc_offset_secs) {
            Ok(time) => match self.rtc.write_time(&time) {
                Ok(()) => {
                    info!("RTC set to {:?}", time);
                    if self.settings.save_last_sync(unix).is_err() {
                        warn!("Failed to save sync record");
                    }
                }
                Err(_) => warn!("RTC write failed, sync record not updated"),
            },
            Err(_) => warn!("Network time outside RTC range"),
        }
        self.end_session();
        self.apply(ModeEvent::SyncSucceeded);
    }

    fn refresh_face(&mut self, now_ms: u64) {
        match self.rtc.read_time() {
            Ok(time) => {
                self.last_reading = Some((time, now_ms));
                let celsius = self.rtc.read_temperature().ok();
                let face = ClockFace::compose(&time, celsius, &self.config);
                if self.display.set_contrast(face.contrast).is_err() {
                    warn!("Contrast update failed");
                }
                let (offset_x, offset_y) = face.offset;
                if self
                    .display
                    .show_clock(
                        &face.time,
                        &face.date,
                        face.weekday,
                        &face.temperature,
                        offset_x,
                        offset_y,
                    )
                    .is_err()
                {
                    warn!("Display refresh failed");
                }
            }
            Err(_) => {
                warn!("RTC read failed");
                let text = self.estimated_time_text(now_ms);
                if self.display.show_time(&text).is_err() {
                    warn!("Display refresh failed");
                }
            }
        }
    }

    /// Last good reading advanced by the elapsed loop time
    fn estimated_time_text(&self, now_ms: u64) -> String<5> {
        let estimate = self.last_reading.and_then(|(time, read_at_ms)| {
            let elapsed = (now_ms.saturating_sub(read_at_ms) / 1000) as i64;
            let unix = time.to_unix(0).ok()? + elapsed;
            WallClock::from_unix(unix, 0).ok()
        });
        match estimate {
            Some(time) => time_text(&time),
            None => {
                let mut text = String::new();
                let _ = text.push_str(TIME_PLACEHOLDER);
                text
            }
        }
    }
}
