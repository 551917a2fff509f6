//! Command/response client for one unit.
//!
//! The client is stateless apart from the driver it talks through and the
//! read timeout. Every operation validates its arguments before touching the
//! transport, builds a single command buffer, and for queries parses the one
//! reply line before returning it. Operations are split by subsystem:
//! [`system`], [`cells`], [`aux_io`] and [`model`].

pub mod aux_io;
pub mod cells;
pub mod model;
pub mod system;

use std::sync::Arc;
use std::time::Duration;

use crate::config::ConnectionConfig;
use crate::driver::CommDriver;
use crate::error::{ErrorCode, Result};
use crate::scpi::{self, TERMINATOR};

/// Timeout applied to every write.
pub const WRITE_TIMEOUT: Duration = Duration::from_millis(250);

/// Read timeout used until [`ScpiClient::set_read_timeout`] changes it.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(150);

pub struct ScpiClient {
    driver: Option<Arc<dyn CommDriver>>,
    read_timeout: Duration,
}

impl ScpiClient {
    /// A client with no driver attached. Every operation fails with
    /// [`ErrorCode::InvalidDriverHandle`] until one is set.
    pub fn new() -> Self {
        Self {
            driver: None,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    pub fn with_driver(driver: Arc<dyn CommDriver>) -> Self {
        Self {
            driver: Some(driver),
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    /// Replaces the driver reference. The previous driver is not touched;
    /// it closes once every other holder drops it.
    pub fn set_driver(&mut self, driver: Option<Arc<dyn CommDriver>>) {
        self.driver = driver;
    }

    pub fn driver(&self) -> Option<Arc<dyn CommDriver>> {
        self.driver.clone()
    }

    /// Opens the transport described by `config` and attaches it.
    ///
    /// The current driver is released first, so on failure the client is
    /// left without one.
    pub fn open(&mut self, config: &ConnectionConfig) -> Result<()> {
        self.driver = None;
        self.driver = Some(config.open()?);
        Ok(())
    }

    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    pub fn set_read_timeout(&mut self, timeout: Duration) {
        self.read_timeout = timeout;
    }

    pub(crate) fn send(&self, command: &str) -> Result<()> {
        let driver = self.driver.as_ref().ok_or(ErrorCode::InvalidDriverHandle)?;
        log::debug!("-> {}", command.trim_end());
        driver.write(command.as_bytes(), WRITE_TIMEOUT)
    }

    /// Writes `command` and reads one reply line.
    ///
    /// A send-only driver is refused before anything is written.
    pub(crate) fn query(&self, command: &str) -> Result<String> {
        let driver = self.driver.as_ref().ok_or(ErrorCode::InvalidDriverHandle)?;
        if driver.is_send_only() {
            return Err(ErrorCode::ReceiveNotAllowed);
        }
        log::debug!("-> {}", command.trim_end());
        driver.write(command.as_bytes(), WRITE_TIMEOUT)?;
        let reply = driver.read_line(self.read_timeout)?;
        log::debug!("<- {}", reply.trim_end());
        Ok(reply)
    }

    /// `<channel header> <arg>` for one channel.
    pub(crate) fn set_channel(&self, header: Header, index: usize, count: usize, arg: &str) -> Result<()> {
        let n = channel_number(index, count)?;
        self.send(&format!("{} {}{}", header.channel(n), arg, TERMINATOR))
    }

    /// `<group header> <arg>,(@1:N)` for every channel.
    pub(crate) fn set_all_channels(&self, header: Header, count: usize, arg: &str) -> Result<()> {
        self.send(&format!(
            "{} {},{}{}",
            header.group(),
            arg,
            scpi::full_channel_range(count),
            TERMINATOR
        ))
    }

    /// `<group header> <arg>,<list>` for the channels set in `mask`.
    /// Nothing is sent when no valid channel is selected.
    pub(crate) fn set_masked_channels(&self, header: Header, mask: u32, count: usize, arg: &str) -> Result<()> {
        match scpi::channel_mask_list(mask, count) {
            Some(list) => self.send(&format!("{} {},{}{}", header.group(), arg, list, TERMINATOR)),
            None => Ok(()),
        }
    }

    /// One buffer with `<channel header> <arg>` for each of `values`,
    /// starting at the first channel, joined with `;`.
    pub(crate) fn set_each_channel<T: Copy>(
        &self,
        header: Header,
        values: &[T],
        count: usize,
        arg: impl Fn(T) -> String,
    ) -> Result<()> {
        if values.len() > count {
            return Err(ErrorCode::InvalidArgument);
        }
        if values.is_empty() {
            return Ok(());
        }
        let mut buf = values
            .iter()
            .enumerate()
            .map(|(i, &v)| format!("{} {}", header.channel(i + 1), arg(v)))
            .collect::<Vec<_>>()
            .join(";");
        buf.push_str(TERMINATOR);
        self.send(&buf)
    }

    /// `<channel header>?` for one channel.
    pub(crate) fn get_channel<T>(
        &self,
        header: Header,
        index: usize,
        count: usize,
        parse: impl Fn(&str) -> Result<T>,
    ) -> Result<T> {
        let n = channel_number(index, count)?;
        let reply = self.query(&format!("{}?{}", header.channel(n), TERMINATOR))?;
        parse(&reply)
    }

    /// `<group header>? (@1:N)` for all `N` channels.
    pub(crate) fn get_all_channels<T, const N: usize>(
        &self,
        header: Header,
        parse: impl Fn(&str) -> Result<T>,
    ) -> Result<[T; N]> {
        let reply = self.query(&format!("{}? {}{}", header.group(), scpi::full_channel_range(N), TERMINATOR))?;
        scpi::parse_array(&reply, parse)
    }

    /// `<group header>? (@1:len)` for the first `out.len()` of `count`
    /// channels. An empty `out` is a no-op.
    pub(crate) fn get_channels_into<T>(
        &self,
        header: Header,
        out: &mut [T],
        count: usize,
        parse: impl Fn(&str) -> Result<T>,
    ) -> Result<()> {
        if out.len() > count {
            return Err(ErrorCode::InvalidArgument);
        }
        if out.is_empty() {
            return Ok(());
        }
        let reply = self.query(&format!(
            "{}? {}{}",
            header.group(),
            scpi::full_channel_range(out.len()),
            TERMINATOR
        ))?;
        scpi::parse_into(&reply, out, parse)
    }
}

/// Command header split around the channel number, so `SOUR` + `:VOLT`
/// yields `SOUR3:VOLT` for one channel and `SOUR:VOLT` for a group.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Header {
    pub root: &'static str,
    pub leaf: &'static str,
}

impl Header {
    pub(crate) const fn new(root: &'static str, leaf: &'static str) -> Self {
        Self { root, leaf }
    }

    fn channel(self, n: usize) -> String {
        format!("{}{}{}", self.root, n, self.leaf)
    }

    fn group(self) -> String {
        format!("{}{}", self.root, self.leaf)
    }
}

impl Default for ScpiClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Converts a zero-based channel index to its one-based wire number.
pub(crate) fn channel_number(index: usize, count: usize) -> Result<usize> {
    if index < count {
        Ok(index + 1)
    } else {
        Err(ErrorCode::ChannelIndexOutOfRange)
    }
}

/// Clamps a setpoint and formats it with four decimals.
pub(crate) fn cell_value(value: f32, min: f32, max: f32) -> String {
    format!("{:.4}", value.clamp(min, max))
}

/// Clamps an auxiliary output level and formats it with three decimals.
pub(crate) fn aux_value(value: f32, min: f32, max: f32) -> String {
    format!("{:.3}", value.clamp(min, max))
}
