//! Binary-coded decimal conversion
//!
//! The DS3231 stores every time field except the weekday as two BCD digits.

/// Encode a value in 0-99 as packed BCD
pub fn encode_bcd(value: u8) -> u8 {
    ((value / 10) << 4) | (value % 10)
}

/// Decode packed BCD
///
/// Nibbles above 9 are not rejected; they decode arithmetically, so `0x1F`
/// reads as 25.
pub fn decode_bcd(bcd: u8) -> u8 {
    (bcd >> 4) * 10 + (bcd & 0x0F)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_values() {
        assert_eq!(encode_bcd(0), 0x00);
        assert_eq!(encode_bcd(9), 0x09);
        assert_eq!(encode_bcd(10), 0x10);
        assert_eq!(encode_bcd(59), 0x59);
        assert_eq!(encode_bcd(99), 0x99);
        assert_eq!(decode_bcd(0x23), 23);
    }

    #[test]
    fn test_malformed_nibble_decodes_arithmetically() {
        assert_eq!(decode_bcd(0x1F), 25);
        assert_eq!(decode_bcd(0x0A), 10);
    }

    proptest! {
        #[test]
        fn prop_bcd_round_trip(n in 0u8..=99) {
            prop_assert_eq!(decode_bcd(encode_bcd(n)), n);
        }

        #[test]
        fn prop_encoded_nibbles_are_digits(n in 0u8..=99) {
            let bcd = encode_bcd(n);
            prop_assert!(bcd >> 4 <= 9);
            prop_assert!(bcd & 0x0F <= 9);
        }
    }
}
