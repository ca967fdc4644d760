//! Inter-task communication channels
//!
//! The clock task owns the orchestrator. Everything else reaches it through
//! the statics below.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use embassy_time::Instant;
use portable_atomic::AtomicBool;

use pixclock_core::traits::NetworkEvent;
use pixclock_protocol::NetworkCredentials;

use crate::network::NetCommand;

/// Radio requests queued by the orchestrator
const COMMAND_CHANNEL_SIZE: usize = 4;

/// Radio outcomes waiting for the next clock tick
const EVENT_CHANNEL_SIZE: usize = 8;

/// Requests for the radio task
pub static NET_COMMANDS: Channel<CriticalSectionRawMutex, NetCommand, COMMAND_CHANNEL_SIZE> =
    Channel::new();

/// Join, disconnect and scan outcomes for the clock task
pub static NET_EVENTS: Channel<CriticalSectionRawMutex, NetworkEvent, EVENT_CHANNEL_SIZE> =
    Channel::new();

/// Credentials submitted through the setup portal
pub static PORTAL_CREDENTIALS: Channel<CriticalSectionRawMutex, NetworkCredentials, 1> =
    Channel::new();

/// Whether the submitted credentials were stored
pub static PORTAL_SAVED: Signal<CriticalSectionRawMutex, bool> = Signal::new();

/// Start an SNTP exchange once the station has an address
pub static SNTP_START: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Set while the setup hotspot is up; gates the portal and DHCP responder
pub static HOTSPOT_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Last SNTP result: Unix seconds and the uptime instant it was received
pub static NETWORK_TIME: Mutex<CriticalSectionRawMutex, Cell<Option<(i64, Instant)>>> =
    Mutex::new(Cell::new(None));
