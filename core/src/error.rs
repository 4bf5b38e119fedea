//! Error types for the redirecting client.
//!
//! # Design
//! Every variant is fatal to the whole run: nothing is retried and a failing
//! hop never falls through to the next redirect target. URL problems get
//! their own enum because callers (and tests) distinguish the three ways a
//! URL can be malformed.

use std::io;
use std::net::SocketAddrV4;

use thiserror::Error;

/// The ways an input string fails to be an absolute `http://` URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlError {
    #[error("URL must begin with http:// (got '{0}')")]
    MissingScheme(String),

    /// Host is empty or longer than the host capacity.
    #[error("Invalid host in URL '{0}'")]
    InvalidHost(String),

    /// Port clause holds a non-digit or lies outside `1..=65535`.
    #[error("Port must be a valid positive integer < 65536 (URL '{0}')")]
    InvalidPort(String),
}

/// A command-line parameter token without a `=`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Parameter '{0}' is not in the form name=value")]
pub struct ParamError(pub String);

/// Errors that abort a redirect run.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    MalformedUrl(#[from] UrlError),

    /// The formatted request does not fit the request capacity. Nothing was sent.
    #[error("Error building HTTP request: {len} bytes exceeds capacity of {capacity}")]
    RequestTooLarge { len: usize, capacity: usize },

    #[error("could not resolve host '{host}': {source}")]
    Resolution {
        host: String,
        #[source]
        source: io::Error,
    },

    #[error("connect to {addr} failed: {source}")]
    Connection {
        addr: SocketAddrV4,
        #[source]
        source: io::Error,
    },

    #[error("send failed: {0}")]
    Send(#[source] io::Error),

    #[error("recv failed: {0}")]
    Receive(#[source] io::Error),

    #[error("Too many redirects ({attempts} attempts)")]
    TooManyRedirects { attempts: usize },

    /// Writing the request echo or the response to the output sink failed.
    #[error("writing output failed: {0}")]
    Output(#[source] io::Error),
}
