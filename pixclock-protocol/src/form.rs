//! URL-encoded form decoding
//!
//! The portal page submits `ssid` and `password` as
//! `application/x-www-form-urlencoded`. Values are percent-decoded and `+`
//! becomes a space. Over-long values are truncated to the record limits.

use heapless::{String, Vec};

use crate::credentials::{NetworkCredentials, MAX_PASSWORD_LEN, MAX_SSID_LEN};

/// Largest form body accepted
pub const MAX_FORM_BODY: usize = 256;

/// Errors from form decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FormError {
    /// No non-empty `ssid` field
    MissingSsid,
    /// Body larger than [`MAX_FORM_BODY`]
    BodyTooLarge,
    /// Body is not valid URL-encoded UTF-8
    Malformed,
}

fn hex_value(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'a'..=b'f' => Some(digit - b'a' + 10),
        b'A'..=b'F' => Some(digit - b'A' + 10),
        _ => None,
    }
}

/// Percent-decode one form value
///
/// Output longer than `N` bytes is cut at the last complete character.
pub fn url_decode<const N: usize>(raw: &str) -> Result<String<N>, FormError> {
    let mut bytes: Vec<u8, N> = Vec::new();
    let mut input = raw.bytes();

    while let Some(byte) = input.next() {
        let decoded = match byte {
            b'+' => b' ',
            b'%' => {
                let hi = input.next().and_then(hex_value).ok_or(FormError::Malformed)?;
                let lo = input.next().and_then(hex_value).ok_or(FormError::Malformed)?;
                (hi << 4) | lo
            }
            other => other,
        };
        if bytes.push(decoded).is_err() {
            break;
        }
    }

    let valid = match core::str::from_utf8(&bytes) {
        Ok(text) => text.len(),
        // A multi-byte character cut by truncation is dropped; anything
        // else is a bad escape sequence.
        Err(e) if e.error_len().is_none() && bytes.is_full() => e.valid_up_to(),
        Err(_) => return Err(FormError::Malformed),
    };
    bytes.truncate(valid);
    String::from_utf8(bytes).map_err(|_| FormError::Malformed)
}

/// Decode the portal submission into credentials
pub fn parse_wifi_form(body: &[u8]) -> Result<NetworkCredentials, FormError> {
    if body.len() > MAX_FORM_BODY {
        return Err(FormError::BodyTooLarge);
    }
    let body = core::str::from_utf8(body).map_err(|_| FormError::Malformed)?;

    let mut ssid: Option<String<MAX_SSID_LEN>> = None;
    let mut password: String<MAX_PASSWORD_LEN> = String::new();

    for pair in body.trim_end().split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        match key {
            "ssid" => ssid = Some(url_decode(value)?),
            "password" => password = url_decode(value)?,
            _ => {}
        }
    }

    let ssid = ssid.filter(|s| !s.is_empty()).ok_or(FormError::MissingSsid)?;
    Ok(NetworkCredentials { ssid, password })
}
