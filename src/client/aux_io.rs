//! Auxiliary analog and digital I/O.

use super::{aux_value, Header, ScpiClient};
use crate::error::Result;
use crate::scpi::{self, flags_to_mask};
use crate::types::{ANALOG_INPUT_COUNT, ANALOG_OUTPUT_COUNT, DIGITAL_INPUT_COUNT, DIGITAL_OUTPUT_COUNT};

const ANALOG_OUTPUT: Header = Header::new("SOUR:AUX:OUT", "");
const DIGITAL_OUTPUT: Header = Header::new("SOUR:DAUX:OUT", "");
const ANALOG_INPUT: Header = Header::new("MEAS:AUX:IN", "");
const DIGITAL_INPUT: Header = Header::new("MEAS:DAUX:IN", "");

/// Analog output levels are clamped to this range before sending.
pub const ANALOG_OUTPUT_RANGE: (f32, f32) = (-10.0, 10.0);

fn analog_arg(v: f32) -> String {
    aux_value(v, ANALOG_OUTPUT_RANGE.0, ANALOG_OUTPUT_RANGE.1)
}

fn level_arg(level: bool) -> String {
    scpi::bool_arg(level).to_string()
}

impl ScpiClient {
    // Analog outputs

    pub fn set_analog_output(&self, channel: usize, voltage: f32) -> Result<()> {
        self.set_channel(ANALOG_OUTPUT, channel, ANALOG_OUTPUT_COUNT, &analog_arg(voltage))
    }

    pub fn set_all_analog_output(&self, voltage: f32) -> Result<()> {
        self.set_all_channels(ANALOG_OUTPUT, ANALOG_OUTPUT_COUNT, &analog_arg(voltage))
    }

    pub fn set_analog_output_masked(&self, channels: u32, voltage: f32) -> Result<()> {
        self.set_masked_channels(ANALOG_OUTPUT, channels, ANALOG_OUTPUT_COUNT, &analog_arg(voltage))
    }

    pub fn set_analog_outputs(&self, voltages: &[f32]) -> Result<()> {
        self.set_each_channel(ANALOG_OUTPUT, voltages, ANALOG_OUTPUT_COUNT, analog_arg)
    }

    pub fn get_analog_output(&self, channel: usize) -> Result<f32> {
        self.get_channel(ANALOG_OUTPUT, channel, ANALOG_OUTPUT_COUNT, scpi::parse_float)
    }

    pub fn get_all_analog_outputs(&self) -> Result<[f32; ANALOG_OUTPUT_COUNT]> {
        self.get_all_channels(ANALOG_OUTPUT, scpi::parse_float)
    }

    pub fn read_analog_outputs(&self, out: &mut [f32]) -> Result<()> {
        self.get_channels_into(ANALOG_OUTPUT, out, ANALOG_OUTPUT_COUNT, scpi::parse_float)
    }

    // Digital outputs

    pub fn set_digital_output(&self, channel: usize, level: bool) -> Result<()> {
        self.set_channel(DIGITAL_OUTPUT, channel, DIGITAL_OUTPUT_COUNT, &level_arg(level))
    }

    pub fn set_all_digital_output(&self, level: bool) -> Result<()> {
        self.set_all_channels(DIGITAL_OUTPUT, DIGITAL_OUTPUT_COUNT, &level_arg(level))
    }

    /// Drives the outputs selected by `channels` to `level`.
    pub fn set_digital_output_masked(&self, channels: u32, level: bool) -> Result<()> {
        self.set_masked_channels(DIGITAL_OUTPUT, channels, DIGITAL_OUTPUT_COUNT, &level_arg(level))
    }

    pub fn set_digital_outputs(&self, levels: &[bool]) -> Result<()> {
        self.set_each_channel(DIGITAL_OUTPUT, levels, DIGITAL_OUTPUT_COUNT, level_arg)
    }

    /// Drives every output at once: high where the bit is set, low where it
    /// is clear.
    pub fn set_digital_output_levels(&self, levels: u32) -> Result<()> {
        let levels: [bool; DIGITAL_OUTPUT_COUNT] = std::array::from_fn(|ch| levels & (1 << ch) != 0);
        self.set_digital_outputs(&levels)
    }

    pub fn get_digital_output(&self, channel: usize) -> Result<bool> {
        self.get_channel(DIGITAL_OUTPUT, channel, DIGITAL_OUTPUT_COUNT, scpi::parse_bool)
    }

    pub fn get_all_digital_outputs(&self) -> Result<[bool; DIGITAL_OUTPUT_COUNT]> {
        self.get_all_channels(DIGITAL_OUTPUT, scpi::parse_bool)
    }

    pub fn get_all_digital_outputs_masked(&self) -> Result<u32> {
        self.get_all_digital_outputs().map(|levels| flags_to_mask(&levels))
    }

    pub fn read_digital_outputs(&self, out: &mut [bool]) -> Result<()> {
        self.get_channels_into(DIGITAL_OUTPUT, out, DIGITAL_OUTPUT_COUNT, scpi::parse_bool)
    }

    // Analog inputs

    pub fn measure_analog_input(&self, channel: usize) -> Result<f32> {
        self.get_channel(ANALOG_INPUT, channel, ANALOG_INPUT_COUNT, scpi::parse_float)
    }

    pub fn measure_all_analog_inputs(&self) -> Result<[f32; ANALOG_INPUT_COUNT]> {
        self.get_all_channels(ANALOG_INPUT, scpi::parse_float)
    }

    pub fn read_analog_inputs(&self, out: &mut [f32]) -> Result<()> {
        self.get_channels_into(ANALOG_INPUT, out, ANALOG_INPUT_COUNT, scpi::parse_float)
    }

    // Digital inputs

    pub fn measure_digital_input(&self, channel: usize) -> Result<bool> {
        self.get_channel(DIGITAL_INPUT, channel, DIGITAL_INPUT_COUNT, scpi::parse_bool)
    }

    pub fn measure_all_digital_inputs(&self) -> Result<[bool; DIGITAL_INPUT_COUNT]> {
        self.get_all_channels(DIGITAL_INPUT, scpi::parse_bool)
    }

    pub fn measure_all_digital_inputs_masked(&self) -> Result<u32> {
        self.measure_all_digital_inputs().map(|levels| flags_to_mask(&levels))
    }

    pub fn read_digital_inputs(&self, out: &mut [bool]) -> Result<()> {
        self.get_channels_into(DIGITAL_INPUT, out, DIGITAL_INPUT_COUNT, scpi::parse_bool)
    }
}
