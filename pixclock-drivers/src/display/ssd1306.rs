//! SSD1306 OLED display driver
//!
//! Driver for 128x64 SSD1306 panels via I2C. The whole frame is rendered
//! into a [`FrameBuffer`] and pushed in horizontal addressing mode, one
//! page-sized chunk per bus write.

use embedded_hal::delay::DelayNs;
use pixclock_core::retry::RetryPolicy;
use pixclock_core::traits::ClockDisplay;
use pixclock_hal::I2cBus;

use super::framebuffer::{string_width, FrameBuffer, HEIGHT, PAGES, WIDTH};

/// Addresses tried in order by [`Ssd1306::probe`]
pub const ADDRESS_CANDIDATES: [u8; 2] = [0x3C, 0x3D];

/// Largest data payload per bus write
pub const CHUNK_SIZE: usize = WIDTH;

/// Retry budget for one data chunk
const CHUNK_RETRY: RetryPolicy = RetryPolicy::new(3, 10);

/// Pause between data chunks
const CHUNK_GAP_MS: u32 = 2;

/// Largest burn-in shift in either direction
pub const MAX_OFFSET: i8 = 2;

/// Contrast programmed by the init sequence
pub const DEFAULT_CONTRAST: u8 = 0xCF;

/// Control byte preceding a command
const CONTROL_COMMAND: u8 = 0x00;
/// Control byte preceding display RAM data
const CONTROL_DATA: u8 = 0x40;

/// SSD1306 commands
#[allow(dead_code)]
mod cmd {
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const SET_CONTRAST: u8 = 0x81;
    pub const DISPLAY_ALL_ON_RESUME: u8 = 0xA4;
    pub const SET_NORMAL: u8 = 0xA6;
    pub const SET_INVERSE: u8 = 0xA7;
    pub const DEACTIVATE_SCROLL: u8 = 0x2E;
    pub const SET_MEMORY_MODE: u8 = 0x20;
    pub const SET_COLUMN_ADDR: u8 = 0x21;
    pub const SET_PAGE_ADDR: u8 = 0x22;
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    pub const SET_COM_PINS: u8 = 0xDA;
    pub const SET_VCOM_DETECT: u8 = 0xDB;
    pub const SET_CLOCK_DIV: u8 = 0xD5;
    pub const SET_PRECHARGE: u8 = 0xD9;
    pub const SET_MUX_RATIO: u8 = 0xA8;
    pub const SET_START_LINE: u8 = 0x40;
    pub const SET_SEG_REMAP: u8 = 0xA1;
    pub const SET_COM_SCAN_DEC: u8 = 0xC8;
    pub const SET_CHARGE_PUMP: u8 = 0x8D;
}

/// Display errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError<E> {
    /// Bus write failed, after retries for frame data
    Bus(E),
    /// No candidate address answered
    NotFound,
}

/// Clamp a signed layout coordinate onto the panel
fn place(x: i16, y: i16) -> (usize, usize) {
    (
        x.clamp(0, WIDTH as i16 - 1) as usize,
        y.clamp(0, HEIGHT as i16 - 1) as usize,
    )
}

/// SSD1306 OLED driver
pub struct Ssd1306<B, D> {
    bus: B,
    delay: D,
    address: u8,
    frame: FrameBuffer,
    contrast: u8,
    offset: (i8, i8),
}

impl<B, D> Ssd1306<B, D>
where
    B: I2cBus,
    D: DelayNs,
{
    /// Create a driver for the panel at `address`; nothing is sent yet
    pub fn new(bus: B, delay: D, address: u8) -> Self {
        Self {
            bus,
            delay,
            address,
            frame: FrameBuffer::new(),
            contrast: DEFAULT_CONTRAST,
            offset: (0, 0),
        }
    }

    /// Find the panel among [`ADDRESS_CANDIDATES`] and initialize it
    ///
    /// Returns the address that completed the init sequence.
    pub fn probe(&mut self) -> Result<u8, DisplayError<B::Error>> {
        for address in ADDRESS_CANDIDATES {
            self.address = address;
            if self.init().is_ok() {
                return Ok(address);
            }
        }
        Err(DisplayError::NotFound)
    }

    /// Run the controller init sequence and leave the panel on and blank
    pub fn init(&mut self) -> Result<(), DisplayError<B::Error>> {
        self.delay.delay_ms(100);

        let init_cmds: &[u8] = &[
            cmd::DISPLAY_OFF,
            cmd::SET_CLOCK_DIV,
            0x80,
            cmd::SET_MUX_RATIO,
            (HEIGHT - 1) as u8,
            cmd::SET_DISPLAY_OFFSET,
            0x00,
            cmd::SET_START_LINE,
            cmd::SET_CHARGE_PUMP,
            0x14,
            cmd::SET_MEMORY_MODE,
            0x00, // Horizontal addressing
            cmd::SET_SEG_REMAP,
            cmd::SET_COM_SCAN_DEC,
            cmd::SET_COM_PINS,
            0x12,
            cmd::SET_CONTRAST,
            DEFAULT_CONTRAST,
            cmd::SET_PRECHARGE,
            0xF1,
            cmd::SET_VCOM_DETECT,
            0x40,
            cmd::DISPLAY_ALL_ON_RESUME,
            cmd::SET_NORMAL,
            cmd::DEACTIVATE_SCROLL,
            cmd::DISPLAY_ON,
        ];

        for &c in init_cmds {
            self.command(c)?;
        }

        self.frame.clear();
        self.contrast = DEFAULT_CONTRAST;
        self.delay.delay_ms(50);
        Ok(())
    }

    /// Bus address in use
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Frame as last rendered
    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    /// Burn-in offset applied by the last [`ClockDisplay::show_clock`]
    pub fn offset(&self) -> (i8, i8) {
        self.offset
    }

    pub fn contrast(&self) -> u8 {
        self.contrast
    }

    /// Give back the bus and delay
    pub fn release(self) -> (B, D) {
        (self.bus, self.delay)
    }

    fn command(&mut self, c: u8) -> Result<(), DisplayError<B::Error>> {
        self.bus
            .write(self.address, &[CONTROL_COMMAND, c])
            .map_err(DisplayError::Bus)
    }

    /// Push the framebuffer to display RAM
    pub fn refresh(&mut self) -> Result<(), DisplayError<B::Error>> {
        self.command(cmd::SET_COLUMN_ADDR)?;
        self.command(0)?;
        self.command((WIDTH - 1) as u8)?;
        self.command(cmd::SET_PAGE_ADDR)?;
        self.command(0)?;
        self.command((PAGES - 1) as u8)?;

        let mut packet = [0u8; CHUNK_SIZE + 1];
        packet[0] = CONTROL_DATA;

        for (i, chunk) in self.frame.as_bytes().chunks(CHUNK_SIZE).enumerate() {
            if i > 0 {
                self.delay.delay_ms(CHUNK_GAP_MS);
            }
            let len = chunk.len() + 1;
            packet[1..len].copy_from_slice(chunk);

            let bus = &mut self.bus;
            let address = self.address;
            CHUNK_RETRY
                .run(&mut self.delay, || bus.write(address, &packet[..len]))
                .map_err(DisplayError::Bus)?;
        }

        Ok(())
    }

    /// Switch the panel on or off; display RAM is kept
    pub fn set_power(&mut self, on: bool) -> Result<(), DisplayError<B::Error>> {
        self.command(if on { cmd::DISPLAY_ON } else { cmd::DISPLAY_OFF })
    }
}

impl<B, D> ClockDisplay for Ssd1306<B, D>
where
    B: I2cBus,
    D: DelayNs,
{
    type Error = DisplayError<B::Error>;

    fn show_clock(
        &mut self,
        time: &str,
        date: &str,
        weekday: &str,
        temperature: &str,
        offset_x: i8,
        offset_y: i8,
    ) -> Result<(), Self::Error> {
        let ox = offset_x.clamp(-MAX_OFFSET, MAX_OFFSET);
        let oy = offset_y.clamp(-MAX_OFFSET, MAX_OFFSET);
        self.offset = (ox, oy);
        let (ox, oy) = (ox as i16, oy as i16);
        let width = WIDTH as i16;

        self.frame.clear();

        // Top row: date left, temperature right and slightly lower
        let (x, y) = place(2 + ox, 1 + oy);
        self.frame.draw_string(x, y, date, 2);

        let temp_width = string_width(temperature, 1) as i16;
        let (x, y) = place(width - temp_width - 1 + ox, 21 + oy);
        self.frame.draw_string(x, y, temperature, 1);

        let (x, y) = place(2 + ox, 17 + oy);
        self.frame.draw_string(x, y, weekday, 2);

        // Bottom half: large time, centred
        let time_width = string_width(time, 4) as i16;
        let (x, y) = place((width - time_width) / 2 + ox, 34 + oy);
        self.frame.draw_string(x, y, time, 4);

        self.refresh()
    }

    fn show_time(&mut self, time: &str) -> Result<(), Self::Error> {
        self.frame.clear();
        let time_width = string_width(time, 2) as i16;
        let (x, y) = place((WIDTH as i16 - time_width) / 2, 28);
        self.frame.draw_string(x, y, time, 2);
        self.refresh()
    }

    fn set_contrast(&mut self, contrast: u8) -> Result<(), Self::Error> {
        if contrast == self.contrast {
            return Ok(());
        }
        self.command(cmd::SET_CONTRAST)?;
        self.command(contrast)?;
        self.contrast = contrast;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::display::framebuffer::BUFFER_SIZE;
    use std::vec::Vec;

    /// Records writes; NACKs absent addresses and a set number of data writes
    #[derive(Default)]
    struct MockBus {
        present: Vec<u8>,
        writes: Vec<(u8, Vec<u8>)>,
        fail_data_writes: u32,
        data_attempts: u32,
    }

    impl MockBus {
        fn with_panel(address: u8) -> Self {
            Self {
                present: std::vec![address],
                ..Default::default()
            }
        }

        fn data_writes(&self) -> Vec<&Vec<u8>> {
            self.writes
                .iter()
                .map(|(_, data)| data)
                .filter(|data| data[0] == CONTROL_DATA)
                .collect()
        }

        fn commands(&self) -> Vec<u8> {
            self.writes
                .iter()
                .filter(|(_, data)| data[0] == CONTROL_COMMAND)
                .map(|(_, data)| data[1])
                .collect()
        }
    }

    impl I2cBus for MockBus {
        type Error = ();

        fn write(&mut self, address: u8, data: &[u8]) -> Result<(), ()> {
            if !self.present.contains(&address) {
                return Err(());
            }
            if data[0] == CONTROL_DATA {
                self.data_attempts += 1;
                if self.fail_data_writes > 0 {
                    self.fail_data_writes -= 1;
                    return Err(());
                }
            }
            self.writes.push((address, data.to_vec()));
            Ok(())
        }

        fn read(&mut self, _address: u8, _buf: &mut [u8]) -> Result<(), ()> {
            Ok(())
        }

        fn write_read(&mut self, _address: u8, _write: &[u8], _read: &mut [u8]) -> Result<(), ()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeDelay {
        total_ms: u32,
    }

    impl DelayNs for FakeDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ms += ns / 1_000_000;
        }

        fn delay_ms(&mut self, ms: u32) {
            self.total_ms += ms;
        }
    }

    fn display(address: u8) -> Ssd1306<MockBus, FakeDelay> {
        Ssd1306::new(MockBus::with_panel(address), FakeDelay::default(), address)
    }

    #[test]
    fn test_probe_falls_back_to_second_address() {
        let mut oled = Ssd1306::new(MockBus::with_panel(0x3D), FakeDelay::default(), 0x3C);
        assert_eq!(oled.probe(), Ok(0x3D));
        assert_eq!(oled.address(), 0x3D);

        let (bus, _) = oled.release();
        let commands = bus.commands();
        assert_eq!(commands.first(), Some(&cmd::DISPLAY_OFF));
        assert_eq!(commands.last(), Some(&cmd::DISPLAY_ON));
        assert!(bus.writes.iter().all(|(address, _)| *address == 0x3D));
    }

    #[test]
    fn test_probe_without_panel() {
        let mut oled = Ssd1306::new(MockBus::default(), FakeDelay::default(), 0x3C);
        assert_eq!(oled.probe(), Err(DisplayError::NotFound));
    }

    #[test]
    fn test_refresh_windows_then_chunks() {
        let mut oled = display(0x3C);
        oled.refresh().unwrap();
        let (bus, delay) = oled.release();

        assert_eq!(bus.commands(), [0x21, 0, 127, 0x22, 0, 7]);
        let chunks = bus.data_writes();
        assert_eq!(chunks.len(), BUFFER_SIZE / CHUNK_SIZE);
        assert!(chunks.iter().all(|c| c.len() == CHUNK_SIZE + 1));
        // Gaps between the 8 chunks only
        assert_eq!(delay.total_ms, 7 * CHUNK_GAP_MS);
    }

    #[test]
    fn test_chunk_retry_recovers() {
        let mut oled = display(0x3C);
        oled.bus.fail_data_writes = 2;
        oled.refresh().unwrap();
        let (bus, delay) = oled.release();

        assert_eq!(bus.data_attempts, 10);
        assert_eq!(bus.data_writes().len(), 8);
        assert_eq!(delay.total_ms, 2 * 10 + 7 * CHUNK_GAP_MS);
    }

    #[test]
    fn test_chunk_retry_exhausted() {
        let mut oled = display(0x3C);
        oled.bus.fail_data_writes = 3;
        assert_eq!(oled.refresh(), Err(DisplayError::Bus(())));
        let (bus, _) = oled.release();
        assert_eq!(bus.data_attempts, 3);
    }

    #[test]
    fn test_contrast_write_skipped_when_unchanged() {
        let mut oled = display(0x3C);
        oled.set_contrast(DEFAULT_CONTRAST).unwrap();
        assert!(oled.bus.writes.is_empty());

        oled.set_contrast(0x9B).unwrap();
        oled.set_contrast(0x9B).unwrap();
        assert_eq!(oled.contrast(), 0x9B);
        assert_eq!(oled.bus.commands(), [cmd::SET_CONTRAST, 0x9B]);
    }

    #[test]
    fn test_set_power() {
        let mut oled = display(0x3C);
        oled.set_power(false).unwrap();
        oled.set_power(true).unwrap();
        assert_eq!(oled.bus.commands(), [cmd::DISPLAY_OFF, cmd::DISPLAY_ON]);
    }

    #[test]
    fn test_show_clock_clamps_offset() {
        let mut oled = display(0x3C);
        oled.show_clock("12:34", "2025-06-15", "Sun", "25.5c", 5, -7).unwrap();
        assert_eq!(oled.offset(), (2, -2));
    }

    #[test]
    fn test_show_clock_layout() {
        let mut oled = display(0x3C);
        oled.show_clock("11:11", "", "", "", 0, 0).unwrap();
        let frame = oled.frame();

        // "1" has an empty first column; 4x digits start at x=12, y=34
        let leftmost = (0..WIDTH).find(|&x| (0..HEIGHT).any(|y| frame.pixel(x, y)));
        assert_eq!(leftmost, Some(12 + 4));
        let top = (0..HEIGHT).find(|&y| (0..WIDTH).any(|x| frame.pixel(x, y)));
        assert_eq!(top, Some(34));
    }

    #[test]
    fn test_show_clock_offset_shifts_everything() {
        let mut centred = display(0x3C);
        centred.show_clock("12:34", "2025-06-15", "Sun", "25.5c", 0, 0).unwrap();
        let mut shifted = display(0x3C);
        shifted.show_clock("12:34", "2025-06-15", "Sun", "25.5c", 1, 1).unwrap();

        for y in 0..HEIGHT - 1 {
            for x in 0..WIDTH - 1 {
                assert_eq!(centred.frame().pixel(x, y), shifted.frame().pixel(x + 1, y + 1));
            }
        }
    }

    #[test]
    fn test_temperature_right_aligned() {
        let mut oled = display(0x3C);
        oled.show_clock("", "", "", "---c", 0, 0).unwrap();
        let frame = oled.frame();
        // Width 23, so the glyphs span x=104..=126
        let rightmost = (0..WIDTH).rev().find(|&x| (0..HEIGHT).any(|y| frame.pixel(x, y)));
        assert_eq!(rightmost, Some(126));
        assert!(frame.pixel(104, 21 + 3));
    }

    #[test]
    fn test_show_time_centred() {
        let mut oled = display(0x3C);
        oled.show_time("12:34").unwrap();
        let frame = oled.frame();
        // Width 58 -> x=35; "1" starts drawing on its second column
        let leftmost = (0..WIDTH).find(|&x| (0..HEIGHT).any(|y| frame.pixel(x, y)));
        assert_eq!(leftmost, Some(37));
        let top = (0..HEIGHT).find(|&y| (0..WIDTH).any(|x| frame.pixel(x, y)));
        assert_eq!(top, Some(28));
    }
}
