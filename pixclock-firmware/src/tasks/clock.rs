//! Clock task
//!
//! Owns the orchestrator and drives it from a fixed ticker. Radio outcomes
//! and portal submissions queued since the last tick are handed over
//! before each tick runs.

use defmt::*;
use embassy_time::{Duration, Instant, Ticker};

use crate::board::Clock;
use crate::channels::{NET_EVENTS, PORTAL_CREDENTIALS, PORTAL_SAVED};

#[embassy_executor::task]
pub async fn clock_task(mut clock: Clock, tick_ms: u32) {
    info!("Clock task started");

    let start = Instant::now();
    clock.boot(start.elapsed().as_millis());

    let mut ticker = Ticker::every(Duration::from_millis(tick_ms as u64));
    loop {
        ticker.next().await;

        while let Ok(event) = NET_EVENTS.try_receive() {
            if let Err(event) = clock.post(event) {
                warn!("Event queue full, dropped {}", event);
            }
        }

        if let Ok(credentials) = PORTAL_CREDENTIALS.try_receive() {
            let saved = clock.submit_credentials(&credentials).is_ok();
            if !saved {
                warn!("Could not store portal credentials");
            }
            PORTAL_SAVED.signal(saved);
        }

        clock.tick(start.elapsed().as_millis());
    }
}
