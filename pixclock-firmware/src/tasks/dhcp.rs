//! DHCP responder for the setup hotspot
//!
//! Listens on UDP 67 for the life of the firmware but only answers while
//! [`HOTSPOT_ACTIVE`] is set, so it stays silent on the home network.

use defmt::*;
use embassy_net::udp::{PacketMetadata, UdpSocket};
use embassy_net::{Ipv4Address, Stack};
use portable_atomic::Ordering;

use pixclock_core::config::HotspotConfig;
use pixclock_protocol::dhcp::{CLIENT_PORT, MAX_REPLY_LEN, SERVER_PORT};
use pixclock_protocol::{DhcpServer, ServerConfig};

use crate::channels::HOTSPOT_ACTIVE;

/// Largest client message we accept (the minimum every host must handle)
const MAX_REQUEST_LEN: usize = 576;

#[embassy_executor::task]
pub async fn dhcp_server_task(stack: Stack<'static>) {
    info!("DHCP responder started");

    let mut rx_meta = [PacketMetadata::EMPTY; 4];
    let mut rx_buffer = [0u8; 1536];
    let mut tx_meta = [PacketMetadata::EMPTY; 2];
    let mut tx_buffer = [0u8; 768];
    let mut socket = UdpSocket::new(stack, &mut rx_meta, &mut rx_buffer, &mut tx_meta, &mut tx_buffer);
    if let Err(e) = socket.bind(SERVER_PORT) {
        error!("DHCP bind failed: {}", e);
        return;
    }

    let mut server: DhcpServer<{ HotspotConfig::MAX_CLIENTS }> = DhcpServer::new(ServerConfig::default());
    let mut request = [0u8; MAX_REQUEST_LEN];
    let mut reply = [0u8; MAX_REPLY_LEN];

    loop {
        let len = match socket.recv_from(&mut request).await {
            Ok((len, _)) => len,
            Err(e) => {
                warn!("DHCP receive failed: {}", e);
                continue;
            }
        };
        if !HOTSPOT_ACTIVE.load(Ordering::Acquire) {
            continue;
        }

        match server.handle(&request[..len], &mut reply) {
            Ok(Some(reply_len)) => {
                if let Err(e) = socket
                    .send_to(&reply[..reply_len], (Ipv4Address::BROADCAST, CLIENT_PORT))
                    .await
                {
                    warn!("DHCP reply failed: {}", e);
                }
            }
            Ok(None) => {}
            Err(e) => debug!("Ignoring DHCP datagram: {}", e),
        }
    }
}
