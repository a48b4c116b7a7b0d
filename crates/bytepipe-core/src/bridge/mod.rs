//! Forward a byte stream through a TCP socket and back.
//!
//! The bridge connects to a local service, streams its input into the
//! socket, half-closes the write side so the peer sees end-of-stream, and
//! then streams the peer's reply to its output until the peer closes. Both
//! legs use [`copy_stream`], so each direction reports the same chunk events
//! as a plain copy.

use std::fmt;
use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};

use crate::copy::{copy_stream, CopyEvent};
use crate::error::{Error, Result};

/// Which leg of the bridge an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Input to socket
    Outbound,
    /// Socket to output
    Inbound,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Outbound => f.write_str("outbound"),
            Self::Inbound => f.write_str("inbound"),
        }
    }
}

/// Byte counts of a completed bridge session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BridgeReport {
    /// Bytes written into the socket
    pub sent: u64,
    /// Bytes read back from the socket
    pub received: u64,
}

/// Connect to `host:port`, trying every resolved address in order.
pub fn connect(host: &str, port: u16) -> Result<TcpStream> {
    let addrs: Vec<SocketAddr> = (host, port)
        .to_socket_addrs()
        .map_err(|_| Error::Resolve(format!("{host}:{port}")))?
        .collect();

    let mut last_err = None;
    for addr in addrs {
        match TcpStream::connect(addr) {
            Ok(stream) => {
                tracing::debug!("Connected to {}", addr);
                return Ok(stream);
            }
            Err(source) => {
                tracing::debug!("Connection to {} failed: {}", addr, source);
                last_err = Some(Error::Connect { addr, source });
            }
        }
    }

    Err(last_err.unwrap_or_else(|| Error::Resolve(format!("{host}:{port}"))))
}

/// Run one request/response exchange over `stream`.
pub fn bridge<R, W, F>(
    mut stream: TcpStream,
    input: &mut R,
    output: &mut W,
    mut observer: F,
) -> Result<BridgeReport>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
    F: FnMut(Direction, &CopyEvent),
{
    let sent = copy_stream(input, &mut stream, |e| observer(Direction::Outbound, e))?;
    stream.shutdown(Shutdown::Write)?;
    tracing::debug!("Half-closed socket after sending {} bytes", sent);

    let received = copy_stream(&mut stream, output, |e| observer(Direction::Inbound, e))?;

    Ok(BridgeReport { sent, received })
}
