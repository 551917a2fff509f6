//! Identity, network settings, the error queue, alarms and reset.

use super::ScpiClient;
use crate::driver::parse_ipv4;
use crate::error::Result;
use crate::scpi::{self, TERMINATOR};
use crate::types::{DeviceInfo, EthernetConfig, ScpiError};

impl ScpiClient {
    /// Reads the `*IDN?` identity. The manufacturer field is discarded.
    pub fn get_device_info(&self) -> Result<DeviceInfo> {
        let reply = self.query("*IDN?\r\n")?;
        scpi::parse_identity(&reply)
    }

    /// RS-485 address the unit answers to.
    pub fn get_device_id(&self) -> Result<u8> {
        let reply = self.query("CONF:COMM:SER:ID?\r\n")?;
        scpi::parse_int(&reply)
    }

    pub fn get_ip_address(&self) -> Result<EthernetConfig> {
        let reply = self.query("SYST:NET:ADDR?\r\n")?;
        let [ip, netmask] = scpi::parse_string_array::<2>(&reply)?;
        Ok(EthernetConfig { ip, netmask })
    }

    /// Stores a new static address. Takes effect after the unit reboots.
    pub fn set_ip_address(&self, config: &EthernetConfig) -> Result<()> {
        let ip = parse_ipv4(&config.ip)?;
        let netmask = parse_ipv4(&config.netmask)?;
        self.send(&format!(
            "SYST:NET:ADDR {},{}{}",
            scpi::quote(&ip.to_string()),
            scpi::quote(&netmask.to_string()),
            TERMINATOR
        ))
    }

    pub fn get_calibration_date(&self) -> Result<String> {
        let reply = self.query("CAL:DATE?\r\n")?;
        scpi::parse_string(&reply)
    }

    /// Number of entries waiting in the error queue.
    pub fn get_error_count(&self) -> Result<i32> {
        let reply = self.query("SYST:ERR:COUN?\r\n")?;
        scpi::parse_int(&reply)
    }

    /// Pops the oldest entry from the error queue.
    pub fn get_next_error(&self) -> Result<ScpiError> {
        let reply = self.query("SYST:ERR?\r\n")?;
        scpi::parse_scpi_error(&reply)
    }

    pub fn clear_errors(&self) -> Result<()> {
        self.send("*CLS\r\n")
    }

    /// Active alarm bits; see [`crate::types::alarms`].
    pub fn get_alarms(&self) -> Result<u32> {
        let reply = self.query("ALAR?\r\n")?;
        scpi::parse_int(&reply)
    }

    /// Clears the recoverable alarms. Critical and fatal alarms stay latched.
    pub fn clear_recoverable_alarms(&self) -> Result<()> {
        self.send("ALAR:CLE\r\n")
    }

    /// Raises the software interlock alarm, which disables every cell.
    pub fn assert_software_interlock(&self) -> Result<()> {
        self.send("ALAR:RAIS 1\r\n")
    }

    pub fn reboot(&self) -> Result<()> {
        self.send("*RST\r\n")
    }
}
