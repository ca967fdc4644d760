//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in pixclock-core for the clock's two I2C peripherals:
//!
//! - DS3231 real-time clock (BCD register codec, temperature, oscillator)
//! - SSD1306 128x64 OLED (framebuffer, 5x7 font rasterizer, paged transport)

#![no_std]
#![deny(unsafe_code)]

pub mod display;
pub mod rtc;
