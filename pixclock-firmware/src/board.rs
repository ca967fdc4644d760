//! Pico W board wiring
//!
//! | Function        | Pin              |
//! |-----------------|------------------|
//! | I2C0 SDA        | GP4              |
//! | I2C0 SCL        | GP5              |
//! | Sync button     | GP15 (to ground) |
//! | CYW43 power     | GP23             |
//! | CYW43 SPI data  | GP24             |
//! | CYW43 SPI CS    | GP25             |
//! | CYW43 SPI clock | GP29             |
//!
//! The DS3231 (0x68) and the SSD1306 (0x3C or 0x3D) share I2C0 at 100 kHz.

use core::cell::RefCell;

use embassy_embedded_hal::shared_bus::blocking::i2c::I2cDevice;
use embassy_rp::i2c::{Blocking, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::Delay;

use pixclock_core::Orchestrator;
use pixclock_drivers::display::Ssd1306;
use pixclock_drivers::rtc::Ds3231;
use pixclock_hal::EmbeddedHalI2c;
use pixclock_hal_rp2040::flash::FlashStorage;

use crate::network::{ChannelNetwork, SntpClock};

/// I2C0 behind a mutex so both devices can hold a handle
pub type SharedBus = Mutex<CriticalSectionRawMutex, RefCell<I2c<'static, I2C0, Blocking>>>;

/// One device's handle on the shared bus
pub type BusHandle = EmbeddedHalI2c<I2cDevice<'static, CriticalSectionRawMutex, I2c<'static, I2C0, Blocking>>>;

pub type Rtc = Ds3231<BusHandle>;

pub type Display = Ssd1306<BusHandle, Delay>;

/// The orchestrator as wired on this board
pub type Clock = Orchestrator<Rtc, Display, FlashStorage<'static>, ChannelNetwork, SntpClock>;
