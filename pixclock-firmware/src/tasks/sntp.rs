//! SNTP client task
//!
//! Woken by [`SNTP_START`] once the station has an address. Retries until
//! a server answers or the link goes away; the orchestrator enforces the
//! overall sync deadline.

use defmt::*;
use embassy_net::dns::{self, DnsQueryType};
use embassy_net::udp::{PacketMetadata, UdpSocket};
use embassy_net::Stack;
use embassy_time::{with_timeout, Duration, Timer};

use pixclock_protocol::sntp::{self, SntpError, NTP_PORT, PACKET_LEN};

use crate::channels::SNTP_START;
use crate::network::publish_network_time;

const NTP_SERVER: &str = "pool.ntp.org";

/// Queries per sync session
const MAX_ATTEMPTS: u8 = 10;

/// Wait for a reply before giving up on one query
const REPLY_TIMEOUT: Duration = Duration::from_secs(5);

/// Pause between failed queries
const RETRY_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Format)]
enum QueryError {
    Dns(dns::Error),
    NoAddress,
    Bind,
    Send,
    Timeout,
    Receive,
    Reply(SntpError),
}

#[embassy_executor::task]
pub async fn sntp_task(stack: Stack<'static>) {
    info!("SNTP task started");

    loop {
        SNTP_START.wait().await;

        for attempt in 1..=MAX_ATTEMPTS {
            if !stack.is_config_up() {
                warn!("Link down, abandoning SNTP");
                break;
            }
            match query(stack).await {
                Ok(unix) => {
                    info!("Network time {}", unix);
                    publish_network_time(unix);
                    break;
                }
                Err(e) => {
                    warn!("SNTP attempt {} failed: {}", attempt, e);
                    Timer::after(RETRY_DELAY).await;
                }
            }
        }
    }
}

async fn query(stack: Stack<'static>) -> Result<i64, QueryError> {
    let addresses = stack
        .dns_query(NTP_SERVER, DnsQueryType::A)
        .await
        .map_err(QueryError::Dns)?;
    let server = *addresses.first().ok_or(QueryError::NoAddress)?;

    let mut rx_meta = [PacketMetadata::EMPTY; 1];
    let mut rx_buffer = [0u8; 128];
    let mut tx_meta = [PacketMetadata::EMPTY; 1];
    let mut tx_buffer = [0u8; 128];
    let mut socket = UdpSocket::new(stack, &mut rx_meta, &mut rx_buffer, &mut tx_meta, &mut tx_buffer);
    socket.bind(0).map_err(|_| QueryError::Bind)?;

    socket
        .send_to(&sntp::request(), (server, NTP_PORT))
        .await
        .map_err(|_| QueryError::Send)?;

    let mut reply = [0u8; PACKET_LEN];
    let (len, _) = with_timeout(REPLY_TIMEOUT, socket.recv_from(&mut reply))
        .await
        .map_err(|_| QueryError::Timeout)?
        .map_err(|_| QueryError::Receive)?;

    sntp::parse_reply(&reply[..len]).map_err(QueryError::Reply)
}
