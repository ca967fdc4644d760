//! Minimal HTTP/1.1 handling for the setup portal
//!
//! Only what the portal needs: parse a request head plus body from one
//! buffer, route it, and serialise a response with a fixed body. The
//! socket handling lives in the firmware.

use core::fmt::Write;

use heapless::String;

use crate::credentials::NetworkCredentials;
use crate::form::{parse_wifi_form, FormError};

/// Configuration page served on `GET /`
pub const CONFIG_PAGE: &str = concat!(
    "<!DOCTYPE html><html><head><meta charset='utf-8'>",
    "<meta name='viewport' content='width=device-width,initial-scale=1'>",
    "<title>PIX Clock Setup</title>",
    "<style>body{font-family:sans-serif;max-width:22em;margin:2em auto;padding:0 1em}",
    "label,input,button{display:block;width:100%;margin-top:.6em;box-sizing:border-box}",
    "input,button{padding:.5em}#status{margin-top:1em}</style></head><body>",
    "<h1>PIX Clock</h1><p>Enter the network the clock should use for time sync.</p>",
    "<form id='f'><label for='ssid'>Network name</label>",
    "<input id='ssid' name='ssid' maxlength='32' required autocomplete='off'>",
    "<label for='password'>Password</label>",
    "<input id='password' name='password' type='password' maxlength='64' autocomplete='off'>",
    "<button type='submit'>Save</button></form><div id='status'></div>",
    "<script>document.getElementById('f').onsubmit=function(e){e.preventDefault();",
    "var s=document.getElementById('status');s.textContent='Saving...';",
    "fetch('/wifi',{method:'POST',headers:{'Content-Type':'application/x-www-form-urlencoded'},",
    "body:new URLSearchParams(new FormData(this)).toString()})",
    ".then(function(r){return r.json()}).then(function(d){s.textContent=d.success?",
    "'Saved. The clock is joining the network and will close this hotspot.':'Error: '+d.message})",
    ".catch(function(err){s.textContent='Network error: '+err});};</script></body></html>",
);

/// Errors from request parsing and response encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HttpError {
    /// Head or body not fully received yet
    Incomplete,
    /// Request line or headers unreadable
    Malformed,
    /// Output buffer too small for the response
    BufferTooSmall,
}

/// Request method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Method {
    Get,
    Post,
    Other,
}

/// A parsed request borrowing from the receive buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request<'a> {
    pub method: Method,
    pub path: &'a str,
    pub body: &'a [u8],
}

impl<'a> Request<'a> {
    /// Parse a request from the bytes received so far
    ///
    /// Returns [`HttpError::Incomplete`] until the blank line ending the
    /// head and `Content-Length` bytes of body have arrived.
    pub fn parse(buf: &'a [u8]) -> Result<Self, HttpError> {
        let head_end = buf
            .windows(4)
            .position(|w| w == b"\r\n\r\n")
            .ok_or(HttpError::Incomplete)?;
        let head = core::str::from_utf8(&buf[..head_end]).map_err(|_| HttpError::Malformed)?;
        let mut lines = head.split("\r\n");

        let mut request_line = lines.next().ok_or(HttpError::Malformed)?.split(' ');
        let method = match request_line.next() {
            Some("GET") => Method::Get,
            Some("POST") => Method::Post,
            Some(m) if !m.is_empty() => Method::Other,
            _ => return Err(HttpError::Malformed),
        };
        let target = request_line.next().ok_or(HttpError::Malformed)?;
        let path = target.split('?').next().unwrap_or(target);

        let mut content_length = 0usize;
        for line in lines {
            let (name, value) = line.split_once(':').ok_or(HttpError::Malformed)?;
            if name.trim().eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().map_err(|_| HttpError::Malformed)?;
            }
        }

        let body = &buf[head_end + 4..];
        if body.len() < content_length {
            return Err(HttpError::Incomplete);
        }

        Ok(Self {
            method,
            path,
            body: &body[..content_length],
        })
    }
}

/// Response status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Status {
    Ok = 200,
    BadRequest = 400,
    NotFound = 404,
    InternalError = 500,
}

impl Status {
    pub fn code(self) -> u16 {
        self as u16
    }

    fn reason(self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::BadRequest => "Bad Request",
            Status::NotFound => "Not Found",
            Status::InternalError => "Internal Server Error",
        }
    }
}

/// Maximum JSON body length
const JSON_BODY_SIZE: usize = 96;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Body {
    Page(&'static str),
    Json(String<JSON_BODY_SIZE>),
}

/// A response ready to be written to the socket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: Status,
    body: Body,
}

impl Response {
    /// The configuration page
    pub fn page() -> Self {
        Self {
            status: Status::Ok,
            body: Body::Page(CONFIG_PAGE),
        }
    }

    /// `{"success":..,"message":".."}` with a fixed message
    ///
    /// Messages are internal constants and are not escaped.
    pub fn json(status: Status, success: bool, message: &str) -> Self {
        let mut body = String::new();
        // Every message used by the portal fits the fixed body size
        let _ = write!(
            body,
            "{{\"success\":{},\"message\":\"{}\"}}",
            success, message
        );
        Self {
            status,
            body: Body::Json(body),
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self.body {
            Body::Page(_) => "text/html; charset=utf-8",
            Body::Json(_) => "application/json",
        }
    }

    pub fn body(&self) -> &str {
        match &self.body {
            Body::Page(page) => page,
            Body::Json(json) => json.as_str(),
        }
    }

    /// Serialise the response head into `out`
    ///
    /// The body is sent separately with [`Response::body`] so the page is
    /// never copied.
    pub fn write_head(&self, out: &mut [u8]) -> Result<usize, HttpError> {
        let mut head: String<160> = String::new();
        write!(
            head,
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            self.status.code(),
            self.status.reason(),
            self.content_type(),
            self.body().len()
        )
        .map_err(|_| HttpError::BufferTooSmall)?;

        let bytes = head.as_bytes();
        out.get_mut(..bytes.len())
            .ok_or(HttpError::BufferTooSmall)?
            .copy_from_slice(bytes);
        Ok(bytes.len())
    }
}

/// What the portal should do with a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Serve the configuration page
    ConfigPage,
    /// Persist these credentials, then answer with [`save_response`]
    SaveCredentials(NetworkCredentials),
    /// Answer immediately
    Respond(Response),
}

/// Route a parsed request
pub fn route(request: &Request<'_>) -> Route {
    match (request.method, request.path) {
        (Method::Get, "/") => Route::ConfigPage,
        (Method::Post, "/wifi") => match parse_wifi_form(request.body) {
            Ok(creds) => Route::SaveCredentials(creds),
            Err(FormError::MissingSsid) => Route::Respond(Response::json(
                Status::BadRequest,
                false,
                "SSID required",
            )),
            Err(_) => Route::Respond(bad_request()),
        },
        _ => Route::Respond(Response::json(Status::NotFound, false, "Not found")),
    }
}

/// Response for a request whose bytes could not be parsed
pub fn bad_request() -> Response {
    Response::json(Status::BadRequest, false, "Invalid request")
}

/// Response after attempting to persist submitted credentials
pub fn save_response<E>(result: Result<(), E>) -> Response {
    match result {
        Ok(()) => Response::json(Status::Ok, true, "Config saved"),
        Err(_) => Response::json(Status::InternalError, false, "Failed to save config"),
    }
}
