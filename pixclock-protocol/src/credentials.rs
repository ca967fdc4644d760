//! Persisted records
//!
//! Both records are stored postcard-encoded under their own storage key.
//! Absence of [`NetworkCredentials`] is the normal "unprovisioned" state,
//! absence of a [`SyncRecord`] means the clock was never synced.

use heapless::String;
use serde::{Deserialize, Serialize};

/// Longest network name accepted (802.11 SSID limit)
pub const MAX_SSID_LEN: usize = 32;

/// Longest passphrase accepted (WPA2 limit)
pub const MAX_PASSWORD_LEN: usize = 64;

/// Errors from record encoding and decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecordError {
    /// Field exceeds its fixed capacity
    FieldTooLong,
    /// Network name is empty
    EmptySsid,
    /// Output buffer too small for the encoded record
    Encode,
    /// Stored bytes are not a valid record
    Decode,
}

/// Station credentials entered through the provisioning portal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkCredentials {
    /// Network name
    pub ssid: String<MAX_SSID_LEN>,
    /// Passphrase, empty for open networks
    pub password: String<MAX_PASSWORD_LEN>,
}

impl NetworkCredentials {
    /// Build credentials, rejecting fields that do not fit
    pub fn new(ssid: &str, password: &str) -> Result<Self, RecordError> {
        if ssid.is_empty() {
            return Err(RecordError::EmptySsid);
        }
        let ssid = String::try_from(ssid).map_err(|_| RecordError::FieldTooLong)?;
        let password = String::try_from(password).map_err(|_| RecordError::FieldTooLong)?;
        Ok(Self { ssid, password })
    }

    /// Build credentials, truncating each field at its capacity
    ///
    /// Truncation happens on a character boundary.
    pub fn truncated(ssid: &str, password: &str) -> Result<Self, RecordError> {
        if ssid.is_empty() {
            return Err(RecordError::EmptySsid);
        }
        Ok(Self {
            ssid: truncate(ssid),
            password: truncate(password),
        })
    }

    /// Encode into `buf`, returning the used prefix
    pub fn encode<'a>(&self, buf: &'a mut [u8]) -> Result<&'a mut [u8], RecordError> {
        postcard::to_slice(self, buf).map_err(|_| RecordError::Encode)
    }

    /// Decode a stored record
    pub fn decode(bytes: &[u8]) -> Result<Self, RecordError> {
        let creds: Self = postcard::from_bytes(bytes).map_err(|_| RecordError::Decode)?;
        if creds.ssid.is_empty() {
            return Err(RecordError::Decode);
        }
        Ok(creds)
    }
}

/// Timestamp of the last successful time sync
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRecord {
    /// Unix seconds (UTC)
    pub last_sync: i64,
}

impl SyncRecord {
    /// Encode into `buf`, returning the used prefix
    pub fn encode<'a>(&self, buf: &'a mut [u8]) -> Result<&'a mut [u8], RecordError> {
        postcard::to_slice(self, buf).map_err(|_| RecordError::Encode)
    }

    /// Decode a stored record
    pub fn decode(bytes: &[u8]) -> Result<Self, RecordError> {
        postcard::from_bytes(bytes).map_err(|_| RecordError::Decode)
    }
}

fn truncate<const N: usize>(text: &str) -> String<N> {
    let mut out = String::new();
    for ch in text.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}
