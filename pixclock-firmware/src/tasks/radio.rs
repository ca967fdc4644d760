//! Radio tasks
//!
//! [`radio_task`] owns the CYW43 control handle and executes the
//! [`NetCommand`]s queued by the orchestrator one at a time. Outcomes go
//! back on [`NET_EVENTS`].

use cyw43::{Control, JoinOptions, PowerManagementMode, ScanOptions};
use cyw43_pio::PioSpi;
use defmt::*;
use embassy_net::{ConfigV4, Ipv4Address, Ipv4Cidr, Stack, StaticConfigV4};
use embassy_rp::gpio::Output;
use embassy_rp::peripherals::{DMA_CH0, PIO0};
use embassy_time::{with_timeout, Duration};
use portable_atomic::Ordering;

use pixclock_core::config::HotspotConfig;
use pixclock_core::traits::{DisconnectReason, NetworkEvent};
use pixclock_protocol::{NetworkCredentials, ServerConfig};

use crate::channels::{HOTSPOT_ACTIVE, NET_COMMANDS, NET_EVENTS, SNTP_START};
use crate::network::NetCommand;

/// Join status reported when no matching network answered
const STATUS_NO_NETWORKS: u32 = 3;
/// Join status reported when the access point refused us
const STATUS_FAIL: u32 = 1;

/// CYW43 bus runner
#[embassy_executor::task]
pub async fn cyw43_task(
    runner: cyw43::Runner<'static, Output<'static>, PioSpi<'static, PIO0, 0, DMA_CH0>>,
) -> ! {
    runner.run().await
}

/// embassy-net stack runner
#[embassy_executor::task]
pub async fn net_task(mut runner: embassy_net::Runner<'static, cyw43::NetDriver<'static>>) -> ! {
    runner.run().await
}

/// Map a failed join's status to what the orchestrator acts on
fn disconnect_reason(status: u32) -> DisconnectReason {
    match status {
        STATUS_NO_NETWORKS => DisconnectReason::NoApFound,
        STATUS_FAIL => DisconnectReason::AuthFailed,
        _ => DisconnectReason::Other,
    }
}

/// Radio command loop
#[embassy_executor::task]
pub async fn radio_task(mut control: Control<'static>, stack: Stack<'static>, join_budget: Duration) {
    info!("Radio task started");

    loop {
        match NET_COMMANDS.receive().await {
            NetCommand::Station(credentials) => {
                stop_hotspot(&mut control).await;
                let event = join(&mut control, stack, &credentials, join_budget).await;
                if event == NetworkEvent::Connected {
                    SNTP_START.signal(());
                }
                NET_EVENTS.send(event).await;
            }
            NetCommand::Hotspot(hotspot) => start_hotspot(&mut control, stack, &hotspot).await,
            NetCommand::StopHotspot => stop_hotspot(&mut control).await,
            NetCommand::Shutdown => {
                stop_hotspot(&mut control).await;
                control.leave().await;
                control
                    .set_power_management(PowerManagementMode::SuperSave)
                    .await;
                info!("Radio idle");
            }
            NetCommand::Scan(target) => {
                let event = scan(&mut control, target.as_str()).await;
                NET_EVENTS.send(event).await;
            }
        }
    }
}

/// Join and wait for a DHCP lease, all within `budget`
///
/// Exactly one outcome is reported per join command.
async fn join(
    control: &mut Control<'static>,
    stack: Stack<'static>,
    credentials: &NetworkCredentials,
    budget: Duration,
) -> NetworkEvent {
    info!("Joining {}", credentials.ssid.as_str());
    stack.set_config_v4(ConfigV4::Dhcp(Default::default()));
    control
        .set_power_management(PowerManagementMode::PowerSave)
        .await;

    match with_timeout(budget, associate(control, stack, credentials)).await {
        Ok(event) => event,
        Err(_) => {
            warn!("No address before timeout");
            control.leave().await;
            NetworkEvent::Disconnected(DisconnectReason::Other)
        }
    }
}

async fn associate(
    control: &mut Control<'static>,
    stack: Stack<'static>,
    credentials: &NetworkCredentials,
) -> NetworkEvent {
    let options = if credentials.password.is_empty() {
        JoinOptions::new_open()
    } else {
        JoinOptions::new(credentials.password.as_bytes())
    };
    if let Err(err) = control.join(credentials.ssid.as_str(), options).await {
        warn!("Join failed with status {}", err.status);
        return NetworkEvent::Disconnected(disconnect_reason(err.status));
    }

    stack.wait_config_up().await;
    if let Some(config) = stack.config_v4() {
        info!("Address {}", config.address);
    }
    NetworkEvent::Connected
}

async fn start_hotspot(control: &mut Control<'static>, stack: Stack<'static>, hotspot: &HotspotConfig) {
    let server = ServerConfig::default();
    let prefix = u32::from_be_bytes(server.netmask).count_ones() as u8;
    stack.set_config_v4(ConfigV4::Static(StaticConfigV4 {
        address: Ipv4Cidr::new(Ipv4Address::from(server.server_ip), prefix),
        gateway: None,
        dns_servers: heapless::Vec::new(),
    }));

    control.set_power_management(PowerManagementMode::None).await;
    control
        .start_ap_wpa2(hotspot.ssid, hotspot.passphrase, hotspot.channel)
        .await;
    HOTSPOT_ACTIVE.store(true, Ordering::Release);
    info!("Hotspot {} up on channel {}", hotspot.ssid, hotspot.channel);
}

async fn stop_hotspot(control: &mut Control<'static>) {
    if HOTSPOT_ACTIVE.swap(false, Ordering::AcqRel) {
        control.close_ap().await;
        info!("Hotspot down");
    }
}

async fn scan(control: &mut Control<'static>, target: &str) -> NetworkEvent {
    let mut networks: u8 = 0;
    let mut target_seen = false;

    let mut scanner = control.scan(ScanOptions::default()).await;
    while let Some(bss) = scanner.next().await {
        networks = networks.saturating_add(1);
        let len = (bss.ssid_len as usize).min(bss.ssid.len());
        if &bss.ssid[..len] == target.as_bytes() {
            target_seen = true;
        }
    }

    info!("Scan found {} networks, target seen: {}", networks, target_seen);
    NetworkEvent::ScanComplete {
        networks,
        target_seen,
    }
}
