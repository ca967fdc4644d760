//! DS3231 real-time clock (I2C)
//!
//! Battery-backed RTC with an integrated temperature-compensated crystal.
//!
//! # Register Map
//!
//! - 0x00-0x06: seconds, minutes, hours, weekday, date, month, year
//!   (BCD, except the weekday which holds 1-7 directly)
//! - 0x0E: control, bit 7 EOSC (cleared = oscillator running)
//! - 0x0F: status, bit 7 OSF (oscillator stopped at some point)
//! - 0x11-0x12: temperature, 10-bit two's complement in 0.25 °C steps,
//!   left-aligned across MSB and LSB

use pixclock_core::time::WallClock;
use pixclock_core::traits::RealTimeClock;
use pixclock_hal::I2cBus;

use super::bcd::{decode_bcd, encode_bcd};

/// Fixed 7-bit bus address
pub const DS3231_ADDR: u8 = 0x68;

/// DS3231 register addresses
pub mod reg {
    /// First timekeeping register
    pub const SECONDS: u8 = 0x00;
    /// Control register
    pub const CONTROL: u8 = 0x0E;
    /// Control/status register
    pub const STATUS: u8 = 0x0F;
    /// Temperature, integer part
    pub const TEMP_MSB: u8 = 0x11;
    /// Temperature, fraction in bits 7-6
    pub const TEMP_LSB: u8 = 0x12;
}

/// Enable-oscillator bit in CONTROL (active low)
const EOSC: u8 = 1 << 7;
/// Oscillator-stop flag in STATUS
const OSF: u8 = 1 << 7;

/// Number of timekeeping registers
const TIME_REGISTERS: usize = 7;

/// DS3231 errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RtcError<E> {
    /// Bus transaction failed
    Bus(E),
    /// Time to write has a field out of range
    InvalidTime,
}

/// Decode the seven timekeeping registers
pub fn decode_time(regs: &[u8; TIME_REGISTERS]) -> WallClock {
    WallClock {
        seconds: decode_bcd(regs[0] & 0x7F),
        minutes: decode_bcd(regs[1] & 0x7F),
        hours: decode_bcd(regs[2] & 0x3F),
        weekday: regs[3] & 0x07,
        day: decode_bcd(regs[4] & 0x3F),
        month: decode_bcd(regs[5] & 0x1F),
        year: decode_bcd(regs[6]),
    }
}

/// Build the block write that sets the timekeeping registers
///
/// The first byte is the register pointer.
pub fn encode_time(time: &WallClock) -> [u8; TIME_REGISTERS + 1] {
    [
        reg::SECONDS,
        encode_bcd(time.seconds),
        encode_bcd(time.minutes),
        encode_bcd(time.hours),
        time.weekday & 0x07,
        encode_bcd(time.day),
        encode_bcd(time.month),
        encode_bcd(time.year),
    ]
}

/// Convert the raw temperature registers to degrees Celsius
pub fn temperature_from_registers(msb: u8, lsb: u8) -> f32 {
    let raw = i16::from_be_bytes([msb, lsb]) >> 6;
    raw as f32 * 0.25
}

/// DS3231 driver
pub struct Ds3231<B> {
    bus: B,
}

impl<B: I2cBus> Ds3231<B> {
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    /// Release the bus handle
    pub fn release(self) -> B {
        self.bus
    }

    fn read_register(&mut self, register: u8) -> Result<u8, RtcError<B::Error>> {
        let mut value = [0u8; 1];
        self.bus
            .write_read(DS3231_ADDR, &[register], &mut value)
            .map_err(RtcError::Bus)?;
        Ok(value[0])
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<(), RtcError<B::Error>> {
        self.bus
            .write(DS3231_ADDR, &[register, value])
            .map_err(RtcError::Bus)
    }

    /// Start or stop the oscillator on battery power
    pub fn set_oscillator_enabled(&mut self, enabled: bool) -> Result<(), RtcError<B::Error>> {
        let control = self.read_register(reg::CONTROL)?;
        let control = if enabled {
            control & !EOSC
        } else {
            control | EOSC
        };
        self.write_register(reg::CONTROL, control)
    }

    /// Check whether the oscillator stopped since the flag was last cleared
    ///
    /// A set flag means the time may be invalid. The flag is reported, not
    /// cleared.
    pub fn oscillator_was_stopped(&mut self) -> Result<bool, RtcError<B::Error>> {
        Ok(self.read_register(reg::STATUS)? & OSF != 0)
    }

    /// Correct the time of day, keeping the stored date and weekday
    ///
    /// Out-of-range fields are rejected before the bus is touched. The
    /// current registers are read once and written back as one block.
    pub fn set_time_of_day(
        &mut self,
        hours: u8,
        minutes: u8,
        seconds: u8,
    ) -> Result<(), RtcError<B::Error>> {
        if hours >= 24 || minutes >= 60 || seconds >= 60 {
            return Err(RtcError::InvalidTime);
        }
        let time = WallClock {
            hours,
            minutes,
            seconds,
            ..self.read_time()?
        };
        self.write_time(&time)
    }
}

impl<B: I2cBus> RealTimeClock for Ds3231<B> {
    type Error = RtcError<B::Error>;

    fn read_time(&mut self) -> Result<WallClock, Self::Error> {
        let mut regs = [0u8; TIME_REGISTERS];
        self.bus
            .write_read(DS3231_ADDR, &[reg::SECONDS], &mut regs)
            .map_err(RtcError::Bus)?;
        Ok(decode_time(&regs))
    }

    fn write_time(&mut self, time: &WallClock) -> Result<(), Self::Error> {
        time.validate().map_err(|_| RtcError::InvalidTime)?;
        self.bus
            .write(DS3231_ADDR, &encode_time(time))
            .map_err(RtcError::Bus)
    }

    fn read_temperature(&mut self) -> Result<f32, Self::Error> {
        let msb = self.read_register(reg::TEMP_MSB)?;
        let lsb = self.read_register(reg::TEMP_LSB)?;
        Ok(temperature_from_registers(msb, lsb))
    }
}
