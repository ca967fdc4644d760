//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod clock;
pub mod dhcp;
pub mod portal;
pub mod radio;
pub mod sntp;

pub use clock::clock_task;
pub use dhcp::dhcp_server_task;
pub use portal::portal_task;
pub use radio::{cyw43_task, net_task, radio_task};
pub use sntp::sntp_task;
