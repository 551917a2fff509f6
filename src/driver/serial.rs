use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio_serial::{DataBits, FlowControl, Parity, SerialPort, SerialStream, StopBits};

use super::{CommDriver, LineStream, Reactor};
use crate::error::{ErrorCode, Result};

pub const BAUD_RATE: u32 = 115200;

/// Device ID that addresses every unit on the bus. Any ID at or above this
/// value is treated as broadcast.
pub const BROADCAST_ID: u32 = 256;

struct SerialLink {
    lines: LineStream<SerialStream>,
    name: String,
}

/// RS-485 multi-drop transport.
///
/// Every frame is prefixed with `@<id> ` so only the addressed unit acts on
/// it. Units 0-255 can be addressed individually; the broadcast ID reaches
/// all of them, and while it is selected nothing may be read back.
pub struct SerialDriver {
    reactor: Reactor,
    link: Mutex<Option<SerialLink>>,
    device_id: AtomicU32,
}

impl SerialDriver {
    pub fn new() -> Result<Self> {
        Ok(Self {
            reactor: Reactor::new()?,
            link: Mutex::new(None),
            device_id: AtomicU32::new(0),
        })
    }

    /// Opens `port_name` at 115200 8N1 without flow control.
    pub fn open(&mut self, port_name: &str) -> Result<()> {
        if self.link.get_mut().is_some() {
            return Err(ErrorCode::AlreadyConnected);
        }

        let builder = tokio_serial::new(port_name, BAUD_RATE);
        let mut port = self.reactor.within(|| SerialStream::open(&builder)).map_err(|e| {
            log::warn!("Failed to open serial port {}: {}", port_name, e);
            ErrorCode::OpeningSerialPortFailed
        })?;

        configure(&mut port).map_err(|e| {
            log::warn!("Failed to configure serial port {}: {}", port_name, e);
            ErrorCode::FailedToConfigurePort
        })?;

        log::info!("Serial link open on {}", port_name);
        self.attach(port, port_name);
        Ok(())
    }

    fn attach(&mut self, port: SerialStream, name: &str) {
        *self.link.get_mut() = Some(SerialLink {
            lines: LineStream::new(port),
            name: name.to_string(),
        });
    }

    pub fn close(&mut self) {
        if let Some(link) = self.link.get_mut().take() {
            log::info!("Closing serial link on {}", link.name);
        }
    }

    pub fn is_open(&self) -> bool {
        self.link.blocking_lock().is_some()
    }
}

fn configure(port: &mut SerialStream) -> tokio_serial::Result<()> {
    port.set_baud_rate(BAUD_RATE)?;
    port.set_data_bits(DataBits::Eight)?;
    port.set_parity(Parity::None)?;
    port.set_stop_bits(StopBits::One)?;
    port.set_flow_control(FlowControl::None)?;
    Ok(())
}

/// Address header placed in front of each frame.
pub(crate) fn address_prefix(id: u32) -> String {
    format!("@{} ", id)
}

/// Names of the serial ports present on this machine.
pub fn available_serial_ports() -> Result<Vec<String>> {
    let ports = serialport::available_ports().map_err(|e| {
        log::warn!("Failed to enumerate serial ports: {}", e);
        ErrorCode::OpeningSerialPortFailed
    })?;
    Ok(ports.into_iter().map(|p| p.port_name).collect())
}

impl CommDriver for SerialDriver {
    fn write(&self, data: &[u8], timeout: Duration) -> Result<()> {
        let mut guard = self.link.blocking_lock();
        let link = guard.as_mut().ok_or(ErrorCode::NotConnected)?;

        let mut frame = address_prefix(self.device_id()).into_bytes();
        frame.extend_from_slice(data);

        match self.reactor.run_for(timeout, link.lines.send(&frame)) {
            None => Err(ErrorCode::SendTimedOut),
            Some(Err(e)) => {
                log::warn!("Serial send on {} failed: {}", link.name, e);
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
                log::warn!("Serial receive on {} failed: {}", link.name, e);
                Err(ErrorCode::ReadFailed)
            }
            Some(Ok(line)) => Ok(line),
        }
    }

    fn set_device_id(&self, id: u32) {
        self.device_id.store(id.min(BROADCAST_ID), Ordering::Relaxed);
    }

    fn device_id(&self) -> u32 {
        self.device_id.load(Ordering::Relaxed)
    }

    fn is_send_only(&self) -> bool {
        self.device_id() >= BROADCAST_ID
    }
}

impl Drop for SerialDriver {
    fn drop(&mut self) {
        self.close();
    }
}
