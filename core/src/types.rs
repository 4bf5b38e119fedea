//! Value types shared across the client: capacity limits and query parameters.

use std::fmt;
use std::str::FromStr;

use crate::error::ParamError;

/// Capacity limits enforced while parsing, building and inspecting.
///
/// `Default` gives the stock sizing: a 255-byte host, 1023-byte path and
/// `Location` value, a 2048-byte request buffer and 10 redirects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Longest accepted host. Longer hosts are `InvalidHost`.
    pub host_capacity: usize,
    /// Paths beyond this many bytes are silently truncated.
    pub path_capacity: usize,
    /// Request buffer size, counting a trailing NUL.
    pub request_capacity: usize,
    /// `Location` values beyond this many bytes are silently truncated.
    pub location_capacity: usize,
    /// The loop fails once the hop counter exceeds this value.
    pub max_redirects: usize,
    /// Size of each socket read.
    pub read_chunk: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            host_capacity: 255,
            path_capacity: 1023,
            request_capacity: 2048,
            location_capacity: 1023,
            max_redirects: 10,
            read_chunk: 8192,
        }
    }
}

/// A `name=value` query parameter, kept exactly as supplied.
///
/// Parameters are appended to the query string in the order given and are
/// never deduplicated or URL-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    raw: String,
    eq: usize,
}

impl Param {
    /// The token as supplied, e.g. `q=cat`.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Everything before the first `=`.
    pub fn name(&self) -> &str {
        &self.raw[..self.eq]
    }

    /// Everything after the first `=`; may be empty.
    pub fn value(&self) -> &str {
        &self.raw[self.eq + 1..]
    }
}

impl FromStr for Param {
    type Err = ParamError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let eq = token.find('=').ok_or_else(|| ParamError(token.to_string()))?;
        Ok(Self {
            raw: token.to_string(),
            eq,
        })
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
