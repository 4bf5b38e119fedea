//! Blocking TCP transport: resolve, connect, send everything, read to close.
//!
//! # Design
//! End of response is the peer closing the connection. Nothing here looks at
//! `Content-Length` or chunk framing, and no socket timeouts are set, so a
//! peer that keeps the connection open stalls the read forever.

use std::io::{self, ErrorKind, Read, Write};
use std::net::{SocketAddr, SocketAddrV4, TcpStream, ToSocketAddrs};

use log::debug;

use crate::error::ClientError;
use crate::http::{HttpRequest, HttpResponse};
use crate::types::Limits;
use crate::url::ParsedUrl;

/// One request/response round-trip.
pub trait Transport {
    fn exchange(
        &mut self,
        target: &ParsedUrl,
        request: &HttpRequest,
    ) -> Result<HttpResponse, ClientError>;
}

/// Opens a fresh IPv4 connection for every exchange.
#[derive(Debug, Clone, Default)]
pub struct TcpTransport {
    limits: Limits,
}

impl TcpTransport {
    pub fn new(limits: Limits) -> Self {
        Self { limits }
    }
}

impl Transport for TcpTransport {
    fn exchange(
        &mut self,
        target: &ParsedUrl,
        request: &HttpRequest,
    ) -> Result<HttpResponse, ClientError> {
        // The stream drops, and so closes, on every path out of this scope.
        let mut stream = connect(&target.host, target.port)?;
        send_all(&mut stream, request.as_bytes())?;
        debug!("sent {} bytes to {}:{}", request.len(), target.host, target.port);
        let raw = receive_to_close(&mut stream, self.limits.read_chunk)?;
        debug!("received {} bytes before close", raw.len());
        Ok(HttpResponse::new(raw))
    }
}

/// Resolve `host` to its first IPv4 address.
pub fn resolve(host: &str, port: u16) -> Result<SocketAddrV4, ClientError> {
    let resolution = |source| ClientError::Resolution {
        host: host.to_string(),
        source,
    };
    (host, port)
        .to_socket_addrs()
        .map_err(resolution)?
        .find_map(|addr| match addr {
            SocketAddr::V4(v4) => Some(v4),
            SocketAddr::V6(_) => None,
        })
        .ok_or_else(|| resolution(io::Error::new(ErrorKind::NotFound, "no IPv4 address")))
}

pub fn connect(host: &str, port: u16) -> Result<TcpStream, ClientError> {
    let addr = resolve(host, port)?;
    debug!("connecting to {addr} for {host}");
    TcpStream::connect(addr).map_err(|source| ClientError::Connection { addr, source })
}

/// Write all of `bytes`, retrying short and interrupted writes.
pub fn send_all<W: Write>(writer: &mut W, bytes: &[u8]) -> Result<(), ClientError> {
    writer
        .write_all(bytes)
        .and_then(|()| writer.flush())
        .map_err(ClientError::Send)
}

/// Read until a zero-length read, growing the buffer by doubling.
///
/// The first allocation is sized to the first read; later growth doubles
/// capacity, or grows to exactly what is needed if doubling falls short.
pub fn receive_to_close<R: Read>(reader: &mut R, chunk: usize) -> Result<Vec<u8>, ClientError> {
    let mut buf = vec![0u8; chunk.max(1)];
    let mut response: Vec<u8> = Vec::new();
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(ClientError::Receive(e)),
        };
        let needed = response.len() + n;
        if needed > response.capacity() {
            let grown = match response.capacity() {
                0 => n,
                cap => cap * 2,
            };
            response.reserve_exact(grown.max(needed) - response.len());
        }
        response.extend_from_slice(&buf[..n]);
    }
    Ok(response)
}
