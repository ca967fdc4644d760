//! Address leases for clients of the setup hotspot
//!
//! The hotspot runs its own tiny DHCP server so a phone joining it gets an
//! address without manual setup. Only the exchanges a client needs to reach
//! the portal are handled: DISCOVER/OFFER, REQUEST/ACK (or NAK) and RELEASE.
//!
//! # Packet Layout (BOOTP)
//!
//! ```text
//! 0      op  htype  hlen  hops
//! 4      xid (4)
//! 8      secs (2)  flags (2)
//! 12     ciaddr  yiaddr  siaddr  giaddr   (4 each)
//! 28     chaddr (16)
//! 44     sname (64)  file (128)
//! 236    magic cookie 99.130.83.99
//! 240    options: code, len, value ... 255
//! ```

/// Port the server listens on
pub const SERVER_PORT: u16 = 67;
/// Port replies are sent to
pub const CLIENT_PORT: u16 = 68;

const MAGIC_COOKIE: [u8; 4] = [99, 130, 83, 99];
const OPTIONS_OFFSET: usize = 240;

/// Buffer size that fits every reply built here
pub const MAX_REPLY_LEN: usize = 300;

const BOOTREQUEST: u8 = 1;
const BOOTREPLY: u8 = 2;
const HTYPE_ETHERNET: u8 = 1;

mod opt {
    pub const PAD: u8 = 0;
    pub const SUBNET_MASK: u8 = 1;
    pub const ROUTER: u8 = 3;
    pub const DNS: u8 = 6;
    pub const REQUESTED_IP: u8 = 50;
    pub const LEASE_TIME: u8 = 51;
    pub const MESSAGE_TYPE: u8 = 53;
    pub const SERVER_ID: u8 = 54;
    pub const END: u8 = 255;
}

/// DHCP errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DhcpError {
    /// Shorter than the fixed header or an option runs past the end
    Truncated,
    /// Not a client request over Ethernet
    NotRequest,
    /// Magic cookie missing
    BadCookie,
    /// No message type option
    MissingMessageType,
    /// Output buffer too small for the reply
    BufferTooSmall,
}

/// DHCP message types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MessageType {
    Discover = 1,
    Offer = 2,
    Request = 3,
    Decline = 4,
    Ack = 5,
    Nak = 6,
    Release = 7,
    Inform = 8,
}

impl MessageType {
    fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Discover),
            2 => Some(Self::Offer),
            3 => Some(Self::Request),
            4 => Some(Self::Decline),
            5 => Some(Self::Ack),
            6 => Some(Self::Nak),
            7 => Some(Self::Release),
            8 => Some(Self::Inform),
            _ => None,
        }
    }
}

/// The parts of a client message the server acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClientMessage {
    pub kind: MessageType,
    pub xid: u32,
    pub flags: u16,
    pub mac: [u8; 6],
    /// Option 50, or ciaddr when the client already holds an address
    pub requested_ip: Option<[u8; 4]>,
}

fn ip_at(buf: &[u8], offset: usize) -> [u8; 4] {
    [buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]]
}

impl ClientMessage {
    pub fn parse(buf: &[u8]) -> Result<Self, DhcpError> {
        if buf.len() < OPTIONS_OFFSET {
            return Err(DhcpError::Truncated);
        }
        if buf[0] != BOOTREQUEST || buf[1] != HTYPE_ETHERNET || buf[2] != 6 {
            return Err(DhcpError::NotRequest);
        }
        if buf[236..240] != MAGIC_COOKIE {
            return Err(DhcpError::BadCookie);
        }

        let mut kind = None;
        let mut requested_ip = None;
        let mut i = OPTIONS_OFFSET;
        while i < buf.len() {
            match buf[i] {
                opt::PAD => i += 1,
                opt::END => break,
                code => {
                    let len = *buf.get(i + 1).ok_or(DhcpError::Truncated)? as usize;
                    let value = buf.get(i + 2..i + 2 + len).ok_or(DhcpError::Truncated)?;
                    match (code, len) {
                        (opt::MESSAGE_TYPE, 1) => kind = MessageType::from_u8(value[0]),
                        (opt::REQUESTED_IP, 4) => requested_ip = Some(ip_at(value, 0)),
                        _ => {}
                    }
                    i += 2 + len;
                }
            }
        }

        let ciaddr = ip_at(buf, 12);
        if requested_ip.is_none() && ciaddr != [0; 4] {
            requested_ip = Some(ciaddr);
        }

        let mut mac = [0u8; 6];
        mac.copy_from_slice(&buf[28..34]);

        Ok(Self {
            kind: kind.ok_or(DhcpError::MissingMessageType)?,
            xid: u32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]]),
            flags: u16::from_be_bytes([buf[10], buf[11]]),
            mac,
            requested_ip,
        })
    }
}

/// Addressing handed out on the hotspot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ServerConfig {
    /// Hotspot address; also given out as router and DNS server
    pub server_ip: [u8; 4],
    pub netmask: [u8; 4],
    /// First client address; the pool is consecutive from here
    pub pool_start: [u8; 4],
    pub lease_secs: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server_ip: [192, 168, 4, 1],
            netmask: [255, 255, 255, 0],
            pool_start: [192, 168, 4, 2],
            lease_secs: 3600,
        }
    }
}

/// Build a reply to `request` into `out`, returning its length
pub fn build_reply(
    request: &ClientMessage,
    kind: MessageType,
    your_ip: [u8; 4],
    config: &ServerConfig,
    out: &mut [u8],
) -> Result<usize, DhcpError> {
    if out.len() < MAX_REPLY_LEN {
        return Err(DhcpError::BufferTooSmall);
    }
    out[..OPTIONS_OFFSET].fill(0);
    out[0] = BOOTREPLY;
    out[1] = HTYPE_ETHERNET;
    out[2] = 6;
    out[4..8].copy_from_slice(&request.xid.to_be_bytes());
    out[10..12].copy_from_slice(&request.flags.to_be_bytes());
    if kind != MessageType::Nak {
        out[16..20].copy_from_slice(&your_ip);
        out[20..24].copy_from_slice(&config.server_ip);
    }
    out[28..34].copy_from_slice(&request.mac);
    out[236..240].copy_from_slice(&MAGIC_COOKIE);

    let mut len = OPTIONS_OFFSET;
    let mut put = |code: u8, value: &[u8]| {
        out[len] = code;
        out[len + 1] = value.len() as u8;
        out[len + 2..len + 2 + value.len()].copy_from_slice(value);
        len += 2 + value.len();
    };
    put(opt::MESSAGE_TYPE, &[kind as u8]);
    put(opt::SERVER_ID, &config.server_ip);
    if kind != MessageType::Nak {
        put(opt::LEASE_TIME, &config.lease_secs.to_be_bytes());
        put(opt::SUBNET_MASK, &config.netmask);
        put(opt::ROUTER, &config.server_ip);
        put(opt::DNS, &config.server_ip);
    }
    out[len] = opt::END;
    Ok(len + 1)
}

/// Lease table and reply logic for up to `N` clients
pub struct DhcpServer<const N: usize> {
    config: ServerConfig,
    leases: [Option<[u8; 6]>; N],
}

impl<const N: usize> DhcpServer<N> {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            leases: [None; N],
        }
    }

    fn address(&self, slot: usize) -> [u8; 4] {
        let mut ip = self.config.pool_start;
        ip[3] = ip[3].wrapping_add(slot as u8);
        ip
    }

    fn slot_of(&self, mac: &[u8; 6]) -> Option<usize> {
        self.leases.iter().position(|lease| lease.as_ref() == Some(mac))
    }

    /// Address leased to `mac`, allocating one if needed
    pub fn lease_for(&mut self, mac: &[u8; 6]) -> Option<[u8; 4]> {
        let slot = match self.slot_of(mac) {
            Some(slot) => slot,
            None => {
                let free = self.leases.iter().position(Option::is_none)?;
                self.leases[free] = Some(*mac);
                free
            }
        };
        Some(self.address(slot))
    }

    pub fn release(&mut self, mac: &[u8; 6]) {
        if let Some(slot) = self.slot_of(mac) {
            self.leases[slot] = None;
        }
    }

    /// Handle one datagram; returns the reply length, if a reply is due
    pub fn handle(&mut self, datagram: &[u8], out: &mut [u8]) -> Result<Option<usize>, DhcpError> {
        let request = ClientMessage::parse(datagram)?;
        let reply = match request.kind {
            MessageType::Discover => self
                .lease_for(&request.mac)
                .map(|ip| (MessageType::Offer, ip)),
            MessageType::Request => match self.lease_for(&request.mac) {
                Some(ip) if request.requested_ip.map_or(true, |r| r == ip) => Some((MessageType::Ack, ip)),
                _ => Some((MessageType::Nak, [0; 4])),
            },
            MessageType::Release | MessageType::Decline => {
                self.release(&request.mac);
                None
            }
            _ => None,
        };

        match reply {
            Some((kind, ip)) => Ok(Some(build_reply(&request, kind, ip, &self.config, out)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHONE: [u8; 6] = [0x02, 0x11, 0x22, 0x33, 0x44, 0x55];
    const LAPTOP: [u8; 6] = [0x02, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE];

    fn client_packet(mac: [u8; 6], kind: MessageType, requested: Option<[u8; 4]>) -> [u8; 300] {
        let mut buf = [0u8; 300];
        buf[0] = BOOTREQUEST;
        buf[1] = HTYPE_ETHERNET;
        buf[2] = 6;
        buf[4..8].copy_from_slice(&0xDEAD_BEEFu32.to_be_bytes());
        buf[10] = 0x80;
        buf[28..34].copy_from_slice(&mac);
        buf[236..240].copy_from_slice(&MAGIC_COOKIE);
        let mut i = OPTIONS_OFFSET;
        buf[i..i + 3].copy_from_slice(&[opt::MESSAGE_TYPE, 1, kind as u8]);
        i += 3;
        if let Some(ip) = requested {
            buf[i..i + 2].copy_from_slice(&[opt::REQUESTED_IP, 4]);
            buf[i + 2..i + 6].copy_from_slice(&ip);
            i += 6;
        }
        buf[i] = opt::END;
        buf
    }

    fn reply_type(reply: &[u8]) -> u8 {
        assert_eq!(reply[240], opt::MESSAGE_TYPE);
        reply[242]
    }

    #[test]
    fn test_parse_discover() {
        let msg = ClientMessage::parse(&client_packet(PHONE, MessageType::Discover, None)).unwrap();
        assert_eq!(msg.kind, MessageType::Discover);
        assert_eq!(msg.xid, 0xDEAD_BEEF);
        assert_eq!(msg.flags, 0x8000);
        assert_eq!(msg.mac, PHONE);
        assert_eq!(msg.requested_ip, None);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(ClientMessage::parse(&[1, 1, 6]), Err(DhcpError::Truncated));

        let mut reply = client_packet(PHONE, MessageType::Discover, None);
        reply[0] = BOOTREPLY;
        assert_eq!(ClientMessage::parse(&reply), Err(DhcpError::NotRequest));

        let mut no_cookie = client_packet(PHONE, MessageType::Discover, None);
        no_cookie[236] = 0;
        assert_eq!(ClientMessage::parse(&no_cookie), Err(DhcpError::BadCookie));

        let mut no_type = client_packet(PHONE, MessageType::Discover, None);
        no_type[240] = opt::END;
        assert_eq!(ClientMessage::parse(&no_type), Err(DhcpError::MissingMessageType));
    }

    #[test]
    fn test_option_overrun_is_truncated() {
        let mut packet = client_packet(PHONE, MessageType::Discover, None);
        packet[243] = 12;
        packet[244] = 200;
        assert_eq!(ClientMessage::parse(&packet), Err(DhcpError::Truncated));
    }

    #[test]
    fn test_discover_then_request() {
        let mut server: DhcpServer<4> = DhcpServer::new(ServerConfig::default());
        let mut out = [0u8; MAX_REPLY_LEN];

        let len = server
            .handle(&client_packet(PHONE, MessageType::Discover, None), &mut out)
            .unwrap()
            .unwrap();
        assert_eq!(reply_type(&out[..len]), MessageType::Offer as u8);
        assert_eq!(out[0], BOOTREPLY);
        assert_eq!(&out[4..8], &0xDEAD_BEEFu32.to_be_bytes());
        assert_eq!(&out[16..20], &[192, 168, 4, 2]);
        assert_eq!(&out[28..34], &PHONE);
        assert_eq!(out[len - 1], opt::END);

        let request = client_packet(PHONE, MessageType::Request, Some([192, 168, 4, 2]));
        let len = server.handle(&request, &mut out).unwrap().unwrap();
        assert_eq!(reply_type(&out[..len]), MessageType::Ack as u8);
    }

    #[test]
    fn test_request_for_foreign_address_is_nak() {
        let mut server: DhcpServer<4> = DhcpServer::new(ServerConfig::default());
        let mut out = [0u8; MAX_REPLY_LEN];
        let request = client_packet(PHONE, MessageType::Request, Some([10, 0, 0, 7]));
        let len = server.handle(&request, &mut out).unwrap().unwrap();
        assert_eq!(reply_type(&out[..len]), MessageType::Nak as u8);
        assert_eq!(&out[16..20], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_leases_are_stable_and_bounded() {
        let mut server: DhcpServer<1> = DhcpServer::new(ServerConfig::default());
        assert_eq!(server.lease_for(&PHONE), Some([192, 168, 4, 2]));
        assert_eq!(server.lease_for(&PHONE), Some([192, 168, 4, 2]));
        assert_eq!(server.lease_for(&LAPTOP), None);

        server.release(&PHONE);
        assert_eq!(server.lease_for(&LAPTOP), Some([192, 168, 4, 2]));
    }

    #[test]
    fn test_release_needs_no_reply() {
        let mut server: DhcpServer<4> = DhcpServer::new(ServerConfig::default());
        let mut out = [0u8; MAX_REPLY_LEN];
        server.lease_for(&PHONE);
        let release = client_packet(PHONE, MessageType::Release, None);
        assert_eq!(server.handle(&release, &mut out), Ok(None));
        assert_eq!(server.lease_for(&LAPTOP), Some([192, 168, 4, 2]));
    }

    #[test]
    fn test_small_output_buffer() {
        let msg = ClientMessage::parse(&client_packet(PHONE, MessageType::Discover, None)).unwrap();
        let mut out = [0u8; 64];
        assert_eq!(
            build_reply(&msg, MessageType::Offer, [192, 168, 4, 2], &ServerConfig::default(), &mut out),
            Err(DhcpError::BufferTooSmall)
        );
    }
}
