//! 5x7 clock font
//!
//! Covers only what the clock face prints: digits, colon, period, hyphen,
//! space and the Celsius `c`. Each glyph is five column bytes, bit 0 at the
//! top row.

/// Glyph width in pixels at scale 1
pub const GLYPH_WIDTH: usize = 5;

/// Glyph height in pixels at scale 1
pub const GLYPH_HEIGHT: usize = 7;

const DIGITS: [[u8; GLYPH_WIDTH]; 10] = [
    [0x3E, 0x51, 0x49, 0x45, 0x3E], // 0
    [0x00, 0x42, 0x7F, 0x40, 0x00], // 1
    [0x42, 0x61, 0x51, 0x49, 0x46], // 2
    [0x21, 0x41, 0x45, 0x4B, 0x31], // 3
    [0x18, 0x14, 0x12, 0x7F, 0x10], // 4
    [0x27, 0x45, 0x45, 0x45, 0x39], // 5
    [0x3C, 0x4A, 0x49, 0x49, 0x30], // 6
    [0x01, 0x71, 0x09, 0x05, 0x03], // 7
    [0x36, 0x49, 0x49, 0x49, 0x36], // 8
    [0x06, 0x49, 0x49, 0x29, 0x1E], // 9
];

const COLON: [u8; GLYPH_WIDTH] = [0x00, 0x36, 0x36, 0x00, 0x00];
const PERIOD: [u8; GLYPH_WIDTH] = [0x00, 0x00, 0x00, 0x00, 0x60];
const HYPHEN: [u8; GLYPH_WIDTH] = [0x08, 0x08, 0x08, 0x08, 0x08];
const SPACE: [u8; GLYPH_WIDTH] = [0x00; GLYPH_WIDTH];
const CELSIUS: [u8; GLYPH_WIDTH] = [0x1C, 0x22, 0x22, 0x22, 0x04];

/// Column bytes for a character, `None` if the font lacks it
pub fn glyph(ch: char) -> Option<&'static [u8; GLYPH_WIDTH]> {
    match ch {
        '0'..='9' => Some(&DIGITS[ch as usize - '0' as usize]),
        ':' => Some(&COLON),
        '.' => Some(&PERIOD),
        '-' => Some(&HYPHEN),
        ' ' => Some(&SPACE),
        'c' | 'C' => Some(&CELSIUS),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_set() {
        for ch in "0123456789:.- cC".chars() {
            assert!(glyph(ch).is_some(), "missing {ch}");
        }
        assert!(glyph('A').is_none());
        assert!(glyph('s').is_none());
    }

    #[test]
    fn test_glyphs_fit_seven_rows() {
        for ch in "0123456789:.- c".chars() {
            for column in glyph(ch).unwrap() {
                assert_eq!(column & 0x80, 0);
            }
        }
    }

    #[test]
    fn test_digit_lookup() {
        assert_eq!(glyph('8'), Some(&[0x36, 0x49, 0x49, 0x49, 0x36]));
        assert_eq!(glyph('C'), glyph('c'));
    }
}
