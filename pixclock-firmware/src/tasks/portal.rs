//! Setup portal on TCP port 80
//!
//! Serves one connection at a time while the hotspot is up. Parsing and
//! routing live in `pixclock-protocol`; this task only moves bytes and
//! hands submitted credentials to the clock task, which owns storage.

use defmt::*;
use embassy_net::tcp::TcpSocket;
use embassy_net::Stack;
use embassy_time::Duration;
use embedded_io_async::Write;
use portable_atomic::Ordering;

use pixclock_protocol::{bad_request, route, save_response, HttpError, Request, Response, Route};

use crate::channels::{HOTSPOT_ACTIVE, PORTAL_CREDENTIALS, PORTAL_SAVED};

const PORTAL_PORT: u16 = 80;

/// Request head and form body together
const REQUEST_BUFFER_SIZE: usize = 1024;

/// Idle connections are dropped after this long
const SOCKET_TIMEOUT: Duration = Duration::from_secs(10);

#[embassy_executor::task]
pub async fn portal_task(stack: Stack<'static>) {
    info!("Portal task started");

    let mut rx_buffer = [0u8; 1024];
    let mut tx_buffer = [0u8; 2048];
    let mut request = [0u8; REQUEST_BUFFER_SIZE];

    loop {
        let mut socket = TcpSocket::new(stack, &mut rx_buffer, &mut tx_buffer);
        socket.set_timeout(Some(SOCKET_TIMEOUT));

        if let Err(e) = socket.accept(PORTAL_PORT).await {
            warn!("Portal accept failed: {}", e);
            continue;
        }
        if !HOTSPOT_ACTIVE.load(Ordering::Acquire) {
            socket.abort();
            let _ = socket.flush().await;
            continue;
        }

        if let Some(response) = read_request(&mut socket, &mut request).await {
            info!("Portal response {}", response.status);
            if let Err(e) = send_response(&mut socket, &response).await {
                warn!("Portal write failed: {}", e);
            }
        }
        socket.close();
        let _ = socket.flush().await;
    }
}

/// Read until a full request has arrived and work out the response
///
/// Returns `None` if the peer went away first.
async fn read_request(socket: &mut TcpSocket<'_>, buf: &mut [u8]) -> Option<Response> {
    let mut filled = 0;
    loop {
        if filled == buf.len() {
            return Some(bad_request());
        }
        match socket.read(&mut buf[filled..]).await {
            Ok(0) => return None,
            Ok(n) => filled += n,
            Err(e) => {
                warn!("Portal read failed: {}", e);
                return None;
            }
        }

        match Request::parse(&buf[..filled]) {
            Ok(request) => return Some(respond(route(&request)).await),
            Err(HttpError::Incomplete) => continue,
            Err(_) => return Some(bad_request()),
        }
    }
}

async fn respond(route: Route) -> Response {
    match route {
        Route::ConfigPage => Response::page(),
        Route::SaveCredentials(credentials) => {
            info!("Portal received credentials for {}", credentials.ssid.as_str());
            PORTAL_SAVED.reset();
            PORTAL_CREDENTIALS.send(credentials).await;
            let saved = PORTAL_SAVED.wait().await;
            save_response(if saved { Ok(()) } else { Err(()) })
        }
        Route::Respond(response) => response,
    }
}

async fn send_response(socket: &mut TcpSocket<'_>, response: &Response) -> Result<(), embassy_net::tcp::Error> {
    let mut head = [0u8; 160];
    let len = match response.write_head(&mut head) {
        Ok(len) => len,
        Err(e) => {
            error!("Response head too large: {}", e);
            return Ok(());
        }
    };
    socket.write_all(&head[..len]).await?;
    socket.write_all(response.body().as_bytes()).await?;
    socket.flush().await
}
