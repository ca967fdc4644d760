//! Monochrome framebuffer and text rasterizer
//!
//! Layout matches the SSD1306 horizontal addressing mode: 8 pages of 128
//! column bytes, bit 0 of each byte at the top of its page.

use super::font::{glyph, GLYPH_HEIGHT, GLYPH_WIDTH};

/// Panel width in pixels
pub const WIDTH: usize = 128;
/// Panel height in pixels
pub const HEIGHT: usize = 64;
/// 8-pixel pages
pub const PAGES: usize = HEIGHT / 8;
/// Bytes in one full frame
pub const BUFFER_SIZE: usize = WIDTH * PAGES;

/// Gap between glyphs; large digits use a fixed 1 pixel to fit the panel
pub fn char_spacing(scale: u8) -> usize {
    if scale >= 4 {
        1
    } else {
        scale as usize
    }
}

/// Pixel width of `text` drawn at `scale`, spacing included
pub fn string_width(text: &str, scale: u8) -> usize {
    let len = text.chars().count();
    if len == 0 {
        return 0;
    }
    len * GLYPH_WIDTH * scale as usize + (len - 1) * char_spacing(scale)
}

/// One frame of pixels
#[derive(Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    buffer: [u8; BUFFER_SIZE],
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    pub const fn new() -> Self {
        Self {
            buffer: [0; BUFFER_SIZE],
        }
    }

    pub fn clear(&mut self) {
        self.buffer.fill(0);
    }

    /// Raw page-ordered bytes, as sent to the controller
    pub fn as_bytes(&self) -> &[u8; BUFFER_SIZE] {
        &self.buffer
    }

    /// Turn a pixel on; coordinates off the panel are ignored
    pub fn set_pixel(&mut self, x: usize, y: usize) {
        if x < WIDTH && y < HEIGHT {
            self.buffer[(y / 8) * WIDTH + x] |= 1 << (y % 8);
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> bool {
        x < WIDTH && y < HEIGHT && self.buffer[(y / 8) * WIDTH + x] & (1 << (y % 8)) != 0
    }

    /// Draw one character with its top-left corner at (x, y)
    ///
    /// Each font pixel becomes a `scale`x`scale` block. Characters missing
    /// from the font draw nothing. Pixels are only ever turned on.
    pub fn draw_glyph(&mut self, x: usize, y: usize, ch: char, scale: u8) {
        let scale = scale as usize;
        if x >= WIDTH || y >= HEIGHT || scale == 0 {
            return;
        }
        let Some(columns) = glyph(ch) else {
            return;
        };

        for (col, bits) in columns.iter().enumerate() {
            for row in 0..GLYPH_HEIGHT {
                if bits & (1 << row) == 0 {
                    continue;
                }
                for sy in 0..scale {
                    for sx in 0..scale {
                        self.set_pixel(x + col * scale + sx, y + row * scale + sy);
                    }
                }
            }
        }
    }

    /// Draw `text` left to right from (x, y)
    ///
    /// Stops before the first glyph that would cross the right edge. An
    /// origin off the panel draws nothing.
    pub fn draw_string(&mut self, x: usize, y: usize, text: &str, scale: u8) {
        if x >= WIDTH || y >= HEIGHT || scale == 0 {
            return;
        }
        let glyph_width = GLYPH_WIDTH * scale as usize;
        let advance = glyph_width + char_spacing(scale);
        let mut cursor = x;

        for ch in text.chars() {
            match cursor.checked_add(glyph_width) {
                Some(end) if end <= WIDTH => {}
                _ => break,
            }
            self.draw_glyph(cursor, y, ch, scale);
            cursor = match cursor.checked_add(advance) {
                Some(next) => next,
                None => break,
            };
        }
    }
}
