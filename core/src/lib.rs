//! Blocking HTTP/1.1 GET client core with bounded redirect following.
//!
//! # Overview
//! Turns an absolute `http://` URL plus an ordered list of `name=value`
//! parameters into raw GET requests, performs each round-trip over a plain
//! TCP connection, and follows `3xx` responses carrying an absolute
//! `Location` until a terminal response or the hop limit is reached.
//!
//! # Design
//! - `ParsedUrl`, `HttpRequest` and `HttpResponse` are plain data; parsing,
//!   building and inspecting them never touches the network.
//! - All socket work sits behind the `Transport` trait. `TcpTransport` is the
//!   production implementation; tests plug in scripted transports.
//! - `RedirectClient` owns the loop and writes every request and raw response
//!   to a caller-supplied sink, so the binary decides where output goes.
//! - A response ends when the peer closes the connection. There is no
//!   `Content-Length` or chunked framing, and no timeouts.
//! - Capacity limits live in one `Limits` value passed explicitly.

pub mod client;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;
pub mod url;

pub use client::{Outcome, RedirectClient, RedirectState};
pub use error::{ClientError, ParamError, UrlError};
pub use http::{HttpRequest, HttpResponse};
pub use transport::{TcpTransport, Transport};
pub use types::{Limits, Param};
pub use url::{is_absolute_http, ParsedUrl};
