//! OLED display drivers

pub mod font;
pub mod framebuffer;
pub mod ssd1306;

pub use framebuffer::{FrameBuffer, HEIGHT, WIDTH};
pub use ssd1306::{DisplayError, Ssd1306, ADDRESS_CANDIDATES};
