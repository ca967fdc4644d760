//! Real-time clock drivers

pub mod bcd;
pub mod ds3231;

pub use bcd::{decode_bcd, encode_bcd};
pub use ds3231::{Ds3231, RtcError, DS3231_ADDR};
