//! PIX Clock provisioning protocol
//!
//! This crate defines the data the clock exchanges with the outside world
//! while it is being set up:
//!
//! - [`credentials`]: the persisted network credentials and sync records
//!   (postcard encoded)
//! - [`form`]: URL-encoded form decoding for the portal submission
//! - [`http`]: the minimal HTTP/1.1 request parsing and routing served on
//!   the setup hotspot
//! - [`dhcp`]: address leases for phones joining the setup hotspot
//! - [`sntp`]: the network time request and reply packets
//!
//! # Portal Overview
//!
//! ```text
//! GET  /       -> configuration page (text/html)
//! POST /wifi   -> ssid=..&password=..  -> {"success":bool,"message":".."}
//! ```
//!
//! Malformed submissions are rejected here with a client-facing response;
//! they never reach the clock state machine.

#![no_std]
#![deny(unsafe_code)]

pub mod credentials;
pub mod dhcp;
pub mod form;
pub mod http;
pub mod sntp;

pub use credentials::{NetworkCredentials, RecordError, SyncRecord, MAX_PASSWORD_LEN, MAX_SSID_LEN};
pub use dhcp::{DhcpError, DhcpServer, ServerConfig};
pub use form::{parse_wifi_form, url_decode, FormError, MAX_FORM_BODY};
pub use http::{bad_request, route, save_response, HttpError, Method, Request, Response, Route, Status};
pub use sntp::SntpError;
