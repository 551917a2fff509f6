//! Finding units on a network segment or an RS-485 bus.
//!
//! Each scan opens a private driver, so it never disturbs a client's link.
//! The scan loops themselves are generic over the driver traits and are
//! public so callers can run them over a transport they already hold.

use std::net::IpAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::driver::{AddressedRead, CommDriver, SerialDriver, UdpMulticastDriver};
use crate::error::{ErrorCode, Result};
use crate::scpi;

const IDENTIFY: &[u8] = b"*IDN?\r\n";
const WRITE_TIMEOUT: Duration = Duration::from_millis(100);

/// How long a multicast scan waits for the next reply before deciding that
/// every unit has answered.
pub const MULTICAST_REPLY_TIMEOUT: Duration = Duration::from_millis(100);

/// How long a serial scan waits for each address to answer.
pub const SERIAL_REPLY_TIMEOUT: Duration = Duration::from_millis(50);

/// A unit that answered a multicast scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EthernetDevice {
    pub ip: IpAddr,
    pub serial: String,
}

/// A unit that answered a serial scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialDevice {
    pub id: u8,
    pub serial: String,
}

/// Finds every unit reachable through the interface that owns
/// `interface_ip`. Units are listed in the order their replies arrived.
pub fn multicast_discovery(interface_ip: &str) -> Result<Vec<EthernetDevice>> {
    let mut driver = UdpMulticastDriver::new()?;
    driver.open(interface_ip)?;
    scan_multicast(&driver)
}

/// Sends one identity query to the group and collects replies until none
/// arrives within [`MULTICAST_REPLY_TIMEOUT`].
pub fn scan_multicast<D: AddressedRead + ?Sized>(driver: &D) -> Result<Vec<EthernetDevice>> {
    driver.write(IDENTIFY, WRITE_TIMEOUT)?;

    let mut devices = Vec::new();
    loop {
        match driver.read_line_from(MULTICAST_REPLY_TIMEOUT) {
            Ok(reply) => {
                let info = scpi::parse_identity(&reply.line)?;
                log::debug!("Unit {} answered from {}", info.serial, reply.source);
                devices.push(EthernetDevice {
                    ip: reply.source,
                    serial: info.serial,
                });
            }
            Err(e) if e.is_timeout() => break,
            Err(e) => {
                log::warn!("Multicast discovery aborted: {}", e);
                return Err(e);
            }
        }
    }

    log::info!("Multicast discovery found {} unit(s)", devices.len());
    Ok(devices)
}

/// Probes every address from `first_id` to `last_id` inclusive on the
/// RS-485 bus behind `port`. Expect a full 0-255 sweep of an empty bus to
/// take well over ten seconds.
pub fn serial_discovery(port: &str, first_id: u8, last_id: u8) -> Result<Vec<SerialDevice>> {
    if last_id < first_id {
        return Err(ErrorCode::InvalidArgument);
    }
    let mut driver = SerialDriver::new()?;
    driver.open(port)?;
    scan_serial(&driver, first_id, last_id)
}

/// Addresses each ID in turn and asks it to identify. IDs that stay silent
/// are skipped; any other failure ends the scan.
pub fn scan_serial<D: CommDriver + ?Sized>(driver: &D, first_id: u8, last_id: u8) -> Result<Vec<SerialDevice>> {
    if last_id < first_id {
        return Err(ErrorCode::InvalidArgument);
    }

    let mut devices = Vec::new();
    for id in first_id..=last_id {
        driver.set_device_id(u32::from(id));
        driver.write(IDENTIFY, WRITE_TIMEOUT)?;

        match driver.read_line(SERIAL_REPLY_TIMEOUT) {
            Ok(line) => {
                let info = scpi::parse_identity(&line)?;
                log::debug!("Unit {} answered at address {}", info.serial, id);
                devices.push(SerialDevice {
                    id,
                    serial: info.serial,
                });
            }
            Err(e) if e.is_timeout() => continue,
            Err(e) => {
                log::warn!("Serial discovery aborted at address {}: {}", id, e);
                return Err(e);
            }
        }
    }

    log::info!(
        "Serial discovery of {}..={} found {} unit(s)",
        first_id,
        last_id,
        devices.len()
    );
    Ok(devices)
}

/// Copies as many results as fit into `out`, keeping their order, and
/// returns how many were copied. Reports [`ErrorCode::BufferTooSmall`] when
/// some had to be left out; `out` is still filled in that case.
pub fn copy_bounded<T: Clone>(items: &[T], out: &mut [T]) -> Result<usize> {
    let n = items.len().min(out.len());
    out[..n].clone_from_slice(&items[..n]);
    if items.len() > out.len() {
        Err(ErrorCode::BufferTooSmall)
    } else {
        Ok(n)
    }
}
