//! How to reach a unit.
//!
//! A [`ConnectionConfig`] names a transport and its endpoint. It is plain data
//! so applications can keep it in their own settings files; opening it yields
//! a ready driver.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::driver::{CommDriver, SerialDriver, TcpDriver, UdpDriver, UdpMulticastDriver};
use crate::error::Result;

/// Connect timeout used when a TCP config does not set one.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 500;

fn default_connect_timeout_ms() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_MS
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "transport", rename_all = "snake_case")]
pub enum ConnectionConfig {
    Udp {
        target_ip: String,
        /// Local interface to send from; any interface when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        interface_ip: Option<String>,
    },
    Tcp {
        target_ip: String,
        #[serde(default = "default_connect_timeout_ms")]
        connect_timeout_ms: u64,
    },
    Serial {
        port: String,
        /// Unit address on the bus; 256 and above broadcasts.
        #[serde(default)]
        device_id: u32,
    },
    UdpMulticast {
        interface_ip: String,
    },
}

impl ConnectionConfig {
    pub fn udp(target_ip: impl Into<String>) -> Self {
        ConnectionConfig::Udp {
            target_ip: target_ip.into(),
            interface_ip: None,
        }
    }

    pub fn tcp(target_ip: impl Into<String>) -> Self {
        ConnectionConfig::Tcp {
            target_ip: target_ip.into(),
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
        }
    }

    pub fn serial(port: impl Into<String>, device_id: u32) -> Self {
        ConnectionConfig::Serial {
            port: port.into(),
            device_id,
        }
    }

    pub fn udp_multicast(interface_ip: impl Into<String>) -> Self {
        ConnectionConfig::UdpMulticast {
            interface_ip: interface_ip.into(),
        }
    }

    /// Short transport name for logs.
    pub fn transport_name(&self) -> &'static str {
        match self {
            ConnectionConfig::Udp { .. } => "udp",
            ConnectionConfig::Tcp { .. } => "tcp",
            ConnectionConfig::Serial { .. } => "serial",
            ConnectionConfig::UdpMulticast { .. } => "udp_multicast",
        }
    }

    /// Builds and opens the driver this config describes.
    pub fn open(&self) -> Result<Arc<dyn CommDriver>> {
        log::info!("Opening {} transport", self.transport_name());
        let driver: Arc<dyn CommDriver> = match self {
            ConnectionConfig::Udp {
                target_ip,
                interface_ip,
            } => {
                let mut driver = UdpDriver::new()?;
                match interface_ip {
                    Some(local) => driver.open_with_interface(local, target_ip)?,
                    None => driver.open(target_ip)?,
                }
                Arc::new(driver)
            }
            ConnectionConfig::Tcp {
                target_ip,
                connect_timeout_ms,
            } => {
                let mut driver = TcpDriver::new()?;
                driver.connect(target_ip, Duration::from_millis(*connect_timeout_ms))?;
                Arc::new(driver)
            }
            ConnectionConfig::Serial { port, device_id } => {
                let mut driver = SerialDriver::new()?;
                driver.open(port)?;
                driver.set_device_id(*device_id);
                Arc::new(driver)
            }
            ConnectionConfig::UdpMulticast { interface_ip } => {
                let mut driver = UdpMulticastDriver::new()?;
                driver.open(interface_ip)?;
                Arc::new(driver)
            }
        };
        Ok(driver)
    }
}
