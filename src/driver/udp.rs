use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;

use tokio::net::UdpSocket;

use super::{parse_ipv4, CommDriver, Reactor, MAX_DATAGRAM, SCPI_PORT};
use crate::error::{ErrorCode, Result};

struct UdpLink {
    socket: UdpSocket,
    target: SocketAddr,
}

/// Unicast UDP transport. Each write is one datagram and each read returns
/// the payload of one datagram unchanged.
pub struct UdpDriver {
    reactor: Reactor,
    link: Option<UdpLink>,
}

impl UdpDriver {
    pub fn new() -> Result<Self> {
        Ok(Self {
            reactor: Reactor::new()?,
            link: None,
        })
    }

    /// Opens a socket on any local interface aimed at `target_ip`.
    pub fn open(&mut self, target_ip: &str) -> Result<()> {
        let target = parse_ipv4(target_ip)?;
        self.open_to(Ipv4Addr::UNSPECIFIED, SocketAddrV4::new(target, SCPI_PORT).into())
    }

    /// Opens a socket bound to the local interface `interface_ip`.
    pub fn open_with_interface(&mut self, interface_ip: &str, target_ip: &str) -> Result<()> {
        let local = parse_ipv4(interface_ip)?;
        let target = parse_ipv4(target_ip)?;
        self.open_to(local, SocketAddrV4::new(target, SCPI_PORT).into())
    }

    fn open_to(&mut self, local: Ipv4Addr, target: SocketAddr) -> Result<()> {
        if self.link.is_some() {
            return Err(ErrorCode::AlreadyConnected);
        }

        let std_socket = std::net::UdpSocket::bind(SocketAddrV4::new(local, 0)).map_err(|e| {
            log::warn!("Failed to bind UDP socket on {}: {}", local, e);
            ErrorCode::FailedToBindSocket
        })?;
        std_socket.set_nonblocking(true).map_err(|_| ErrorCode::SocketError)?;
        let socket = self
            .reactor
            .within(|| UdpSocket::from_std(std_socket))
            .map_err(|_| ErrorCode::SocketError)?;

        log::info!("UDP link open to {}", target);
        self.link = Some(UdpLink { socket, target });
        Ok(())
    }

    pub fn close(&mut self) {
        if let Some(link) = self.link.take() {
            log::info!("Closing UDP link to {}", link.target);
        }
    }

    pub fn is_open(&self) -> bool {
        self.link.is_some()
    }

    /// Local address the socket is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        let link = self.link.as_ref().ok_or(ErrorCode::NotConnected)?;
        link.socket.local_addr().map_err(|_| ErrorCode::SocketError)
    }
}

impl CommDriver for UdpDriver {
    fn write(&self, data: &[u8], timeout: Duration) -> Result<()> {
        let link = self.link.as_ref().ok_or(ErrorCode::NotConnected)?;
        match self.reactor.run_for(timeout, link.socket.send_to(data, link.target)) {
            None => Err(ErrorCode::SendTimedOut),
            Some(Err(e)) => {
                log::warn!("UDP send to {} failed: {}", link.target, e);
                Err(ErrorCode::SendFailed)
            }
            Some(Ok(_)) => Ok(()),
        }
    }

    fn read_line(&self, timeout: Duration) -> Result<String> {
        let link = self.link.as_ref().ok_or(ErrorCode::NotConnected)?;
        let mut buf = vec![0u8; MAX_DATAGRAM];
        match self.reactor.run_for(timeout, link.socket.recv(&mut buf)) {
            None => Err(ErrorCode::ReadTimedOut),
            Some(Err(e)) => {
                log::warn!("UDP receive failed: {}", e);
                Err(ErrorCode::ReadFailed)
            }
            Some(Ok(n)) => Ok(String::from_utf8_lossy(&buf[..n]).into_owned()),
        }
    }
}

impl Drop for UdpDriver {
    fn drop(&mut self) {
        self.close();
    }
}
