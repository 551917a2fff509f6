//! Host-side driver for 8-cell battery simulator units.
//!
//! A [`ScpiClient`] talks to one unit through any [`driver::CommDriver`]:
//! UDP, TCP, RS-485 serial, or UDP multicast for commands addressed to every
//! unit at once. [`discovery`] finds units on a network or serial bus.
//!
//! ```no_run
//! use abs_scpi::{ConnectionConfig, ScpiClient};
//!
//! let mut client = ScpiClient::new();
//! client.open(&ConnectionConfig::tcp("192.168.1.70"))?;
//! client.set_all_cell_voltage(3.7)?;
//! client.enable_all_cells(true)?;
//! let volts = client.measure_all_cell_voltages()?;
//! # Ok::<(), abs_scpi::ErrorCode>(())
//! ```

pub mod client;
pub mod config;
pub mod discovery;
pub mod driver;
pub mod error;
pub mod scpi;
pub mod types;

pub use client::ScpiClient;
pub use config::ConnectionConfig;
pub use discovery::{multicast_discovery, serial_discovery, EthernetDevice, SerialDevice};
pub use error::{error_message, ErrorCode, Result};
pub use types::*;
