use std::net::{SocketAddr, SocketAddrV4};
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::Mutex;

use super::{parse_ipv4, CommDriver, LineStream, Reactor, SCPI_PORT};
use crate::error::{ErrorCode, Result};

struct TcpLink {
    lines: LineStream<TcpStream>,
    peer: SocketAddr,
}

/// TCP stream transport. Replies are split on `\n`; bytes that arrive ahead
/// of a line end are kept for the next read, including across a read that
/// timed out.
pub struct TcpDriver {
    reactor: Reactor,
    link: Mutex<Option<TcpLink>>,
}

impl TcpDriver {
    pub fn new() -> Result<Self> {
        Ok(Self {
            reactor: Reactor::new()?,
            link: Mutex::new(None),
        })
    }

    /// Connects to the unit at `target_ip`, giving up after `timeout`.
    pub fn connect(&mut self, target_ip: &str, timeout: Duration) -> Result<()> {
        let ip = parse_ipv4(target_ip)?;
        self.connect_to(SocketAddrV4::new(ip, SCPI_PORT).into(), timeout)
    }

    fn connect_to(&mut self, peer: SocketAddr, timeout: Duration) -> Result<()> {
        let link = self.link.get_mut();
        if link.is_some() {
            return Err(ErrorCode::AlreadyConnected);
        }

        let stream = match self.reactor.run_for(timeout, TcpStream::connect(peer)) {
            None => {
                log::warn!("Connection to {} timed out after {:?}", peer, timeout);
                return Err(ErrorCode::ConnectionTimedOut);
            }
            Some(Err(e)) => {
                log::warn!("Connection to {} failed: {}", peer, e);
                return Err(ErrorCode::ConnectionFailed);
            }
            Some(Ok(stream)) => stream,
        };
        if let Err(e) = stream.set_nodelay(true) {
            log::debug!("Could not disable Nagle on {}: {}", peer, e);
        }

        log::info!("TCP link open to {}", peer);
        *link = Some(TcpLink {
            lines: LineStream::new(stream),
            peer,
        });
        Ok(())
    }

    pub fn close(&mut self) {
        if let Some(link) = self.link.get_mut().take() {
            log::info!("Closing TCP link to {}", link.peer);
        }
    }

    pub fn is_connected(&self) -> bool {
        self.link.blocking_lock().is_some()
    }
}

impl CommDriver for TcpDriver {
    fn write(&self, data: &[u8], timeout: Duration) -> Result<()> {
        let mut guard = self.link.blocking_lock();
        let link = guard.as_mut().ok_or(ErrorCode::NotConnected)?;
        match self.reactor.run_for(timeout, link.lines.send(data)) {
            None => Err(ErrorCode::SendTimedOut),
            Some(Err(e)) => {
                log::warn!("TCP send to {} failed: {}", link.peer, e);
                Err(ErrorCode::SendFailed)
            }
            Some(Ok(())) => Ok(()),
        }
    }

    fn read_line(&self, timeout: Duration) -> Result<String> {
        let mut guard = self.link.blocking_lock();
        let link = guard.as_mut().ok_or(ErrorCode::NotConnected)?;
        match self.reactor.read_line(&mut link.lines, timeout) {
            None => Err(ErrorCode::ReadTimedOut),
            Some(Err(e)) => {
                log::warn!("TCP receive from {} failed: {}", link.peer, e);
                Err(ErrorCode::ReadFailed)
            }
            Some(Ok(line)) => Ok(line),
        }
    }
}

impl Drop for TcpDriver {
    fn drop(&mut self) {
        self.close();
    }
}
