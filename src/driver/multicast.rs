use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;

use super::{parse_ipv4, AddressedLine, AddressedRead, CommDriver, Reactor, MAX_DATAGRAM, SCPI_PORT};
use crate::error::{ErrorCode, Result};

/// Group every unit listens on for broadcast commands.
pub const MULTICAST_GROUP: Ipv4Addr = Ipv4Addr::new(239, 188, 26, 181);

/// Replies from a whole segment can arrive at once.
const RECEIVE_BUFFER_SIZE: usize = 64 * 1024;

struct MulticastLink {
    socket: UdpSocket,
    interface: Ipv4Addr,
    group: SocketAddr,
}

/// Sends one command to every unit on the local network at once.
///
/// Replies from many units interleave, so the generic read path is refused
/// and the client treats this transport as send-only. Discovery uses
/// [`AddressedRead::read_line_from`] instead to tell the replies apart.
pub struct UdpMulticastDriver {
    reactor: Reactor,
    link: Option<MulticastLink>,
}

impl UdpMulticastDriver {
    pub fn new() -> Result<Self> {
        Ok(Self {
            reactor: Reactor::new()?,
            link: None,
        })
    }

    /// Joins the unit group on the interface that owns `interface_ip`.
    pub fn open(&mut self, interface_ip: &str) -> Result<()> {
        let interface = parse_ipv4(interface_ip)?;
        self.open_to(interface, SocketAddrV4::new(MULTICAST_GROUP, SCPI_PORT).into())
    }

    fn open_to(&mut self, interface: Ipv4Addr, group: SocketAddr) -> Result<()> {
        if self.link.is_some() {
            return Err(ErrorCode::AlreadyConnected);
        }

        let std_socket = group_socket(interface)?;
        let socket = self
            .reactor
            .within(|| UdpSocket::from_std(std_socket))
            .map_err(|_| ErrorCode::SocketError)?;

        log::info!("Multicast link open on {} to {}", interface, group);
        self.link = Some(MulticastLink {
            socket,
            interface,
            group,
        });
        Ok(())
    }

    pub fn close(&mut self) {
        if let Some(link) = self.link.take() {
            if let Err(e) = link.socket.leave_multicast_v4(MULTICAST_GROUP, link.interface) {
                log::debug!("Leaving multicast group on {} failed: {}", link.interface, e);
            }
            log::info!("Closing multicast link on {}", link.interface);
        }
    }

    pub fn is_open(&self) -> bool {
        self.link.is_some()
    }

    fn receive(&self, timeout: Duration) -> Result<(String, SocketAddr)> {
        let link = self.link.as_ref().ok_or(ErrorCode::NotConnected)?;
        let mut buf = vec![0u8; MAX_DATAGRAM];
        match self.reactor.run_for(timeout, link.socket.recv_from(&mut buf)) {
            None => Err(ErrorCode::ReadTimedOut),
            Some(Err(e)) => {
                log::warn!("Multicast receive failed: {}", e);
                Err(ErrorCode::ReadFailed)
            }
            Some(Ok((n, from))) => Ok((String::from_utf8_lossy(&buf[..n]).into_owned(), from)),
        }
    }
}

/// A socket bound to `interface` whose group traffic leaves through that
/// interface.
fn egress_socket(interface: Ipv4Addr) -> Result<Socket> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP)).map_err(|e| {
        log::warn!("Failed to create multicast socket: {}", e);
        ErrorCode::SocketError
    })?;
    socket
        .set_recv_buffer_size(RECEIVE_BUFFER_SIZE)
        .map_err(|_| ErrorCode::SocketError)?;
    socket
        .bind(&SocketAddrV4::new(interface, 0).into())
        .map_err(|e| {
            log::warn!("Failed to bind multicast socket on {}: {}", interface, e);
            ErrorCode::FailedToBindSocket
        })?;
    // The bind address alone does not select the egress interface for
    // multicast on every platform.
    socket.set_multicast_if_v4(&interface).map_err(|e| {
        log::warn!("Failed to route multicast through {}: {}", interface, e);
        ErrorCode::SocketError
    })?;
    Ok(socket)
}

/// An egress socket that has also joined the unit group, ready for tokio.
fn group_socket(interface: Ipv4Addr) -> Result<std::net::UdpSocket> {
    let socket = egress_socket(interface)?;
    socket
        .join_multicast_v4(&MULTICAST_GROUP, &interface)
        .map_err(|e| {
            log::warn!("Failed to join {} on {}: {}", MULTICAST_GROUP, interface, e);
            ErrorCode::FailedToJoinGroup
        })?;
    socket.set_nonblocking(true).map_err(|_| ErrorCode::SocketError)?;
    Ok(socket.into())
}

impl CommDriver for UdpMulticastDriver {
    fn write(&self, data: &[u8], timeout: Duration) -> Result<()> {
        let link = self.link.as_ref().ok_or(ErrorCode::NotConnected)?;
        match self.reactor.run_for(timeout, link.socket.send_to(data, link.group)) {
            None => Err(ErrorCode::SendTimedOut),
            Some(Err(e)) => {
                log::warn!("Multicast send to {} failed: {}", link.group, e);
                Err(ErrorCode::SendFailed)
            }
            Some(Ok(_)) => Ok(()),
        }
    }

    fn read_line(&self, timeout: Duration) -> Result<String> {
        self.receive(timeout).map(|(line, _)| line)
    }

    fn is_send_only(&self) -> bool {
        true
    }
}

impl AddressedRead for UdpMulticastDriver {
    fn read_line_from(&self, timeout: Duration) -> Result<AddressedLine> {
        let (line, from) = self.receive(timeout)?;
        Ok(AddressedLine {
            line,
            source: from.ip(),
        })
    }
}

impl Drop for UdpMulticastDriver {
    fn drop(&mut self) {
        self.close();
    }
}
