//! Raw HTTP/1.1 request and response values.
//!
//! # Design
//! A request is formatted once per hop and kept as the exact text that goes
//! on the wire. A response is the byte sequence read until the peer closed
//! the connection, so it may contain anything, NUL bytes included. Header
//! inspection works on that raw buffer and never splits it into a header
//! block and a body.

use std::fmt;

use crate::error::ClientError;
use crate::types::{Limits, Param};

/// A GET request, formatted and ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    target: String,
    text: String,
}

impl HttpRequest {
    /// Format `GET <path>[?params] HTTP/1.1` with a single `Host` header.
    ///
    /// Parameters are joined with `&` after a `?`, or after an `&` when `path`
    /// already carries a query string. Fails with `RequestTooLarge` when the
    /// text does not fit `limits.request_capacity`, which counts a trailing
    /// NUL: the longest accepted request is one byte shorter than capacity.
    pub fn get(
        host: &str,
        path: &str,
        params: &[Param],
        limits: &Limits,
    ) -> Result<Self, ClientError> {
        let mut target = path.to_string();
        if !params.is_empty() {
            target.push(if target.contains('?') { '&' } else { '?' });
            let joined: Vec<&str> = params.iter().map(Param::as_str).collect();
            target.push_str(&joined.join("&"));
        }

        let text = format!("GET {target} HTTP/1.1\r\nHost: {host}\r\n\r\n");
        if text.len() >= limits.request_capacity {
            return Err(ClientError::RequestTooLarge {
                len: text.len(),
                capacity: limits.request_capacity,
            });
        }
        Ok(Self { target, text })
    }

    /// Path plus query string as it appears on the request line.
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl fmt::Display for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Everything the peer sent before closing the connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpResponse {
    raw: Vec<u8>,
}

impl HttpResponse {
    pub fn new(raw: Vec<u8>) -> Self {
        Self { raw }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn status_code(&self) -> Option<u16> {
        status_code(&self.raw)
    }

    pub fn location(&self, limits: &Limits) -> Option<Vec<u8>> {
        location_header(&self.raw, limits.location_capacity)
    }
}

impl From<Vec<u8>> for HttpResponse {
    fn from(raw: Vec<u8>) -> Self {
        Self::new(raw)
    }
}

/// Status code from the first `HTTP/` marker in `raw`.
///
/// The code is the (up to) three bytes after the first run of spaces that
/// follows the marker. `None` when the buffer is empty, the marker or the
/// space is missing, or that window holds a non-digit.
pub fn status_code(raw: &[u8]) -> Option<u16> {
    let start = find(raw, b"HTTP/")?;
    let line = &raw[start..];
    let space = line.iter().position(|&b| b == b' ')?;
    let code = &line[space..];
    let code = &code[code.iter().take_while(|&&b| b == b' ').count()..];
    let window = &code[..code.len().min(3)];
    if window.is_empty() || !window.iter().all(u8::is_ascii_digit) {
        return None;
    }
    Some(window.iter().fold(0, |acc, &d| acc * 10 + u16::from(d - b'0')))
}

/// Value of the first `location:` token anywhere in `raw`, ignoring case.
///
/// The match is not anchored to a line start, so a body containing the token
/// matches too. Leading spaces and tabs are skipped; the value runs to the
/// first CR, LF or end of buffer and is cut to `capacity` bytes. The bytes
/// are returned exactly as received.
pub fn location_header(raw: &[u8], capacity: usize) -> Option<Vec<u8>> {
    const TOKEN: &[u8] = b"location:";

    let at = raw
        .windows(TOKEN.len())
        .position(|w| w.eq_ignore_ascii_case(TOKEN))?;
    let value = &raw[at + TOKEN.len()..];
    let value = &value[value.iter().take_while(|&&b| b == b' ' || b == b'\t').count()..];
    let end = value
        .iter()
        .position(|&b| b == b'\r' || b == b'\n')
        .unwrap_or(value.len());
    Some(value[..end.min(capacity)].to_vec())
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
