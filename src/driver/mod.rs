//! Transports that carry SCPI text to and from a unit.
//!
//! All drivers are synchronous. Each owns a current-thread tokio runtime that
//! only runs while a call is in progress: the I/O future for one primitive is
//! driven under `tokio::time::timeout`, and when the deadline passes the
//! future is dropped, which cancels the outstanding operation before the call
//! returns. Calls must therefore not be made from inside another tokio
//! runtime.
//!
//! A driver may be shared between a client and other holders through `Arc`.
//! No locking spans a write and the matching read, so two threads issuing
//! queries on the same driver can receive each other's replies.

pub mod multicast;
pub mod serial;
pub mod tcp;
pub mod udp;

pub use multicast::{UdpMulticastDriver, MULTICAST_GROUP};
pub use serial::{available_serial_ports, SerialDriver, BAUD_RATE, BROADCAST_ID};
pub use tcp::TcpDriver;
pub use udp::UdpDriver;

use std::future::Future;
use std::io;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::runtime::{Builder, Runtime};

use crate::error::{ErrorCode, Result};

/// Port the unit listens on for UDP, TCP and multicast traffic.
pub const SCPI_PORT: u16 = 5025;

/// Largest datagram a single UDP read will accept.
pub(crate) const MAX_DATAGRAM: usize = 8192;

/// Capabilities every transport offers to the client and to discovery.
pub trait CommDriver: Send + Sync {
    /// Sends `data` as one unit of transmission.
    fn write(&self, data: &[u8], timeout: Duration) -> Result<()>;

    /// Receives one reply line.
    fn read_line(&self, timeout: Duration) -> Result<String>;

    /// Selects the target unit on a multi-drop bus. Ignored by transports
    /// that address units by IP.
    fn set_device_id(&self, _id: u32) {}

    fn device_id(&self) -> u32 {
        0
    }

    /// True if replies can never be attributed to a single unit, in which
    /// case queries are refused.
    fn is_send_only(&self) -> bool {
        false
    }
}

/// A received line together with the address of the unit that sent it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressedLine {
    pub line: String,
    pub source: IpAddr,
}

/// Transports that can report where each reply came from.
pub trait AddressedRead: CommDriver {
    fn read_line_from(&self, timeout: Duration) -> Result<AddressedLine>;
}

/// Validates a dotted-quad IPv4 literal.
pub fn parse_ipv4(text: &str) -> Result<Ipv4Addr> {
    text.trim().parse::<Ipv4Addr>().map_err(|_| {
        log::warn!("Rejected IP address {:?}", text);
        ErrorCode::InvalidIPAddress
    })
}

/// Call-scoped reactor shared by the socket and serial drivers.
pub(crate) struct Reactor {
    runtime: Runtime,
}

impl Reactor {
    pub(crate) fn new() -> Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build().map_err(|e| {
            log::error!("Failed to start I/O reactor: {}", e);
            ErrorCode::SocketError
        })?;
        Ok(Self { runtime })
    }

    /// Drives `operation` to completion or until `timeout` elapses.
    /// Returns `None` on timeout, after the operation has been dropped.
    pub(crate) fn run_for<F: Future>(&self, timeout: Duration, operation: F) -> Option<F::Output> {
        self.runtime
            .block_on(async { tokio::time::timeout(timeout, operation).await.ok() })
    }

    /// Runs a synchronous constructor that must see the reactor, such as
    /// registering a socket or serial stream.
    pub(crate) fn within<T>(&self, f: impl FnOnce() -> T) -> T {
        let _guard = self.runtime.enter();
        f()
    }
}

/// A byte stream read one `\n`-terminated line at a time.
///
/// Bytes of a line that has not fully arrived are kept in `partial`, so a
/// read that times out loses nothing and the next read picks up the rest.
pub(crate) struct LineStream<S> {
    reader: BufReader<S>,
    partial: Vec<u8>,
}

impl<S: AsyncRead + AsyncWrite + Unpin> LineStream<S> {
    pub(crate) fn new(stream: S) -> Self {
        Self {
            reader: BufReader::new(stream),
            partial: Vec::new(),
        }
    }

    /// Writes `data` in full and flushes it out of the stream.
    pub(crate) async fn send(&mut self, data: &[u8]) -> io::Result<()> {
        let stream = self.reader.get_mut();
        stream.write_all(data).await?;
        stream.flush().await
    }

    /// Reads the next complete line without its terminator. End of stream
    /// before a line end is an error.
    pub(crate) async fn next_line(&mut self) -> io::Result<String> {
        self.reader.read_until(b'\n', &mut self.partial).await?;
        if self.partial.last() != Some(&b'\n') {
            return Err(io::Error::from(io::ErrorKind::UnexpectedEof));
        }
        Ok(finish_line(std::mem::take(&mut self.partial)))
    }
}

impl Reactor {
    /// Reads one line from `lines`, or `None` once `timeout` has passed.
    pub(crate) fn read_line<S>(&self, lines: &mut LineStream<S>, timeout: Duration) -> Option<io::Result<String>>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        self.run_for(timeout, lines.next_line())
    }
}

/// Drops the `\n` ending `line` and any `\r` before it.
fn finish_line(mut line: Vec<u8>) -> String {
    if line.last() == Some(&b'\n') {
        line.pop();
    }
    if line.last() == Some(&b'\r') {
        line.pop();
    }
    String::from_utf8_lossy(&line).into_owned()
}
