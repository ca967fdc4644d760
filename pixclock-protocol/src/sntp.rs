//! SNTP request and reply packets
//!
//! Only the client side of a unicast exchange: a 48-byte mode 3 request,
//! and the transmit timestamp of the server's mode 4 reply converted to
//! Unix seconds.

/// Server port
pub const NTP_PORT: u16 = 123;

/// Length of a packet without extensions
pub const PACKET_LEN: usize = 48;

/// Seconds from 1900-01-01 to 1970-01-01
pub const NTP_UNIX_OFFSET: i64 = 2_208_988_800;

/// LI=0, VN=3, Mode=3 (client)
const CLIENT_HEADER: u8 = 0x1B;

const MODE_SERVER: u8 = 4;
const LEAP_ALARM: u8 = 3;
const MAX_STRATUM: u8 = 15;

/// Offset of the transmit timestamp seconds
const TRANSMIT_SECONDS: usize = 40;

/// SNTP reply errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SntpError {
    /// Fewer than 48 bytes
    Truncated,
    /// Mode is not "server"
    NotServerReply,
    /// Server reports its own clock as unsynchronized
    Unsynchronized,
    /// Kiss-of-death (stratum 0) or stratum above 15
    InvalidStratum(u8),
    /// Transmit timestamp is zero
    MissingTimestamp,
}

/// Build a client request
pub fn request() -> [u8; PACKET_LEN] {
    let mut packet = [0u8; PACKET_LEN];
    packet[0] = CLIENT_HEADER;
    packet
}

/// Extract Unix seconds from a server reply
///
/// Timestamps below 2^31 are read as NTP era 1 (after February 2036).
pub fn parse_reply(reply: &[u8]) -> Result<i64, SntpError> {
    if reply.len() < PACKET_LEN {
        return Err(SntpError::Truncated);
    }
    if reply[0] & 0x07 != MODE_SERVER {
        return Err(SntpError::NotServerReply);
    }
    if reply[0] >> 6 == LEAP_ALARM {
        return Err(SntpError::Unsynchronized);
    }
    let stratum = reply[1];
    if stratum == 0 || stratum > MAX_STRATUM {
        return Err(SntpError::InvalidStratum(stratum));
    }

    let seconds = u32::from_be_bytes([
        reply[TRANSMIT_SECONDS],
        reply[TRANSMIT_SECONDS + 1],
        reply[TRANSMIT_SECONDS + 2],
        reply[TRANSMIT_SECONDS + 3],
    ]);
    if seconds == 0 {
        return Err(SntpError::MissingTimestamp);
    }

    let mut ntp = seconds as i64;
    if seconds < 0x8000_0000 {
        ntp += 1 << 32;
    }
    Ok(ntp - NTP_UNIX_OFFSET)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(header: u8, stratum: u8, seconds: u32) -> [u8; PACKET_LEN] {
        let mut packet = [0u8; PACKET_LEN];
        packet[0] = header;
        packet[1] = stratum;
        packet[40..44].copy_from_slice(&seconds.to_be_bytes());
        packet
    }

    #[test]
    fn test_request_header() {
        let packet = request();
        assert_eq!(packet[0], 0x1B);
        assert!(packet[1..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_parse_reply() {
        // 2025-06-15 04:02:03 UTC
        let packet = reply(0x24, 2, 3_958_948_923);
        assert_eq!(parse_reply(&packet), Ok(1_749_960_123));
    }

    #[test]
    fn test_era_rollover() {
        // 2036-02-07 06:28:17 UTC is NTP second 1 of era 1
        let packet = reply(0x24, 1, 1);
        assert_eq!(parse_reply(&packet), Ok(2_085_978_497));
    }

    #[test]
    fn test_rejections() {
        assert_eq!(parse_reply(&[0x24; 47]), Err(SntpError::Truncated));
        assert_eq!(parse_reply(&reply(0x1B, 2, 1)), Err(SntpError::NotServerReply));
        assert_eq!(parse_reply(&reply(0xE4, 2, 1)), Err(SntpError::Unsynchronized));
        assert_eq!(parse_reply(&reply(0x24, 0, 1)), Err(SntpError::InvalidStratum(0)));
        assert_eq!(parse_reply(&reply(0x24, 16, 1)), Err(SntpError::InvalidStratum(16)));
        assert_eq!(parse_reply(&reply(0x24, 2, 0)), Err(SntpError::MissingTimestamp));
    }
}
