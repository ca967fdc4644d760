//! PIX Clock - Desk Clock Firmware
//!
//! Firmware for a Raspberry Pi Pico W driving a DS3231 RTC and a 128x64
//! SSD1306 panel. The clock runs from the RTC and joins WiFi only for the
//! periodic SNTP sync, or serves a setup hotspot when no network is
//! configured.

#![no_std]
#![no_main]

use core::cell::RefCell;

use cyw43_pio::{PioSpi, DEFAULT_CLOCK_DIVIDER};
use defmt::*;
use embassy_embedded_hal::shared_bus::blocking::i2c::I2cDevice;
use embassy_executor::Spawner;
use embassy_net::{Config as NetConfig, StackResources};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::PIO0;
use embassy_rp::pio::{InterruptHandler as PioInterruptHandler, Pio};
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::{Delay, Duration};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use pixclock_core::config::ClockConfig;
use pixclock_core::Orchestrator;
use pixclock_drivers::display::{Ssd1306, ADDRESS_CANDIDATES};
use pixclock_drivers::rtc::Ds3231;
use pixclock_hal::{EmbeddedHalI2c, I2cConfig};
use pixclock_hal_rp2040::flash::FlashStorage;

mod board;
mod channels;
mod network;
mod tasks;

use board::SharedBus;
use network::{ChannelNetwork, SntpClock};

bind_interrupts!(struct Irqs {
    PIO0_IRQ_0 => PioInterruptHandler<PIO0>;
});

/// DHCP client, DNS, SNTP, DHCP responder and portal
const NET_SOCKETS: usize = 5;

/// Seed for the network stack's port and sequence number choices
const NET_SEED: u64 = 0x5049_5843_4c4f_434b;

static I2C_BUS: StaticCell<SharedBus> = StaticCell::new();
static WIFI_STATE: StaticCell<cyw43::State> = StaticCell::new();
static NET_RESOURCES: StaticCell<StackResources<NET_SOCKETS>> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("PIX clock firmware starting...");

    let p = embassy_rp::init(Default::default());
    let config = ClockConfig::default();

    // Holding the sync button at power-up forces a sync
    let sync_button = Input::new(p.PIN_15, Pull::Up);
    let force_sync = sync_button.is_low();

    // Shared I2C0: DS3231 and SSD1306
    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = I2cConfig::STANDARD.frequency;
    let i2c = I2c::new_blocking(p.I2C0, p.PIN_5, p.PIN_4, i2c_config);
    let bus: &'static SharedBus = I2C_BUS.init(Mutex::new(RefCell::new(i2c)));

    let mut rtc = Ds3231::new(EmbeddedHalI2c::new(I2cDevice::new(bus)));
    if let Err(e) = rtc.set_oscillator_enabled(true) {
        warn!("RTC not responding: {}", Debug2Format(&e));
    }
    if let Ok(true) = rtc.oscillator_was_stopped() {
        warn!("RTC oscillator stopped since it was last set; time may be wrong");
    }

    let mut display = Ssd1306::new(
        EmbeddedHalI2c::new(I2cDevice::new(bus)),
        Delay,
        ADDRESS_CANDIDATES[0],
    );
    match display.probe() {
        Ok(address) => info!("Display found at {:#x}", address),
        Err(e) => warn!("Display not found: {}", Debug2Format(&e)),
    }

    let storage = FlashStorage::new(p.FLASH);
    info!("Storage initialized");

    // CYW43 WiFi over PIO SPI
    let fw = cyw43_firmware::CYW43_43439A0;
    let clm = cyw43_firmware::CYW43_43439A0_CLM;

    let pwr = Output::new(p.PIN_23, Level::Low);
    let cs = Output::new(p.PIN_25, Level::High);
    let mut pio = Pio::new(p.PIO0, Irqs);
    let spi = PioSpi::new(
        &mut pio.common,
        pio.sm0,
        DEFAULT_CLOCK_DIVIDER,
        pio.irq0,
        cs,
        p.PIN_24,
        p.PIN_29,
        p.DMA_CH0,
    );

    let state = WIFI_STATE.init(cyw43::State::new());
    let (net_device, mut control, runner) = cyw43::new(state, pwr, spi, fw).await;
    spawner.spawn(tasks::cyw43_task(runner)).unwrap();

    control.init(clm).await;
    control
        .set_power_management(cyw43::PowerManagementMode::PowerSave)
        .await;

    let (stack, runner) = embassy_net::new(
        net_device,
        NetConfig::dhcpv4(Default::default()),
        NET_RESOURCES.init(StackResources::new()),
        NET_SEED,
    );
    spawner.spawn(tasks::net_task(runner)).unwrap();
    info!("WiFi initialized");

    let join_budget = Duration::from_millis(config.radio_join_budget_ms as u64);
    spawner.spawn(tasks::radio_task(control, stack, join_budget)).unwrap();
    spawner.spawn(tasks::sntp_task(stack)).unwrap();
    spawner.spawn(tasks::dhcp_server_task(stack)).unwrap();
    spawner.spawn(tasks::portal_task(stack)).unwrap();

    let mut clock = Orchestrator::new(rtc, display, storage, ChannelNetwork, SntpClock, config);
    if force_sync {
        info!("Sync button held, forcing a sync");
        clock.request_force_sync();
    }
    spawner.spawn(tasks::clock_task(clock, config.tick_ms)).unwrap();

    info!("All tasks spawned");
}
