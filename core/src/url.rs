//! Decomposition of absolute `http://` URLs into host, port and path.

use crate::error::UrlError;
use crate::types::Limits;

pub const HTTP_PREFIX: &str = "http://";
pub const DEFAULT_PORT: u16 = 80;

/// Longest port clause accepted before the digits are even parsed.
const MAX_PORT_DIGITS: usize = 9;

/// Target of a single hop.
///
/// `host` is non-empty and holds no `:` or `/`; `path` always starts with
/// `/` and carries any query string from the URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUrl {
    pub host: String,
    pub port: u16,
    pub path: String,
}

impl ParsedUrl {
    pub fn parse(url: &str, limits: &Limits) -> Result<Self, UrlError> {
        let rest = url
            .strip_prefix(HTTP_PREFIX)
            .ok_or_else(|| UrlError::MissingScheme(url.to_string()))?;

        let host_end = rest.find([':', '/']).unwrap_or(rest.len());
        let (host, mut rest) = rest.split_at(host_end);
        if host.is_empty() || host.len() > limits.host_capacity {
            return Err(UrlError::InvalidHost(url.to_string()));
        }

        let mut port = DEFAULT_PORT;
        if let Some(clause) = rest.strip_prefix(':') {
            let end = clause.find('/').unwrap_or(clause.len());
            let (digits, tail) = clause.split_at(end);
            port = parse_port(digits).ok_or_else(|| UrlError::InvalidPort(url.to_string()))?;
            rest = tail;
        }

        let path = if rest.starts_with('/') {
            truncate(rest, limits.path_capacity)
        } else {
            "/"
        };

        Ok(Self {
            host: host.to_string(),
            port,
            path: path.to_string(),
        })
    }
}

fn parse_port(digits: &str) -> Option<u16> {
    if digits.is_empty()
        || digits.len() > MAX_PORT_DIGITS
        || !digits.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    match digits.parse::<u32>().ok()? {
        0 => None,
        n => u16::try_from(n).ok(),
    }
}

/// Cut `s` to at most `max` bytes without splitting a character.
fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// True iff `url` begins with the literal `http://`.
pub fn is_absolute_http(url: &str) -> bool {
    url.starts_with(HTTP_PREFIX)
}
