//! Cell outputs: enable state, setpoints, faults, sense range and
//! measurements.
//!
//! Setters offer four shapes: one cell, every cell with the same value
//! (`_all_`), a bitmask of cells with the same value (`_masked`), and one
//! value per cell starting at cell 0 (plural name, taking a slice). Getters
//! come as one cell, all cells as an array, and the first `out.len()` cells
//! into a caller buffer (`read_`).

use super::{cell_value, Header, ScpiClient};
use crate::error::Result;
use crate::scpi::{self, flags_to_mask, Mnemonic};
use crate::types::{CellFault, CellMode, CellPrecisionMode, CellSenseRange, CELL_COUNT};

const ENABLE: Header = Header::new("OUTP", "");
const VOLTAGE: Header = Header::new("SOUR", ":VOLT");
const SOURCING: Header = Header::new("SOUR", ":CURR:SRC");
const SINKING: Header = Header::new("SOUR", ":CURR:SNK");
const FAULT: Header = Header::new("OUTP", ":FAUL");
const SENSE_RANGE: Header = Header::new("SENS", ":RANG");
const MEASURED_VOLTAGE: Header = Header::new("MEAS", ":VOLT");
const MEASURED_CURRENT: Header = Header::new("MEAS", ":CURR");
const AVERAGE_VOLTAGE: Header = Header::new("MEAS", ":VOLT:AVER");
const AVERAGE_CURRENT: Header = Header::new("MEAS", ":CURR:AVER");
const OPERATING_MODE: Header = Header::new("OUTP", ":MODE");

/// Valid setpoint ranges; values outside are clamped before sending.
pub const VOLTAGE_RANGE: (f32, f32) = (0.0, 5.0);
pub const SOURCING_RANGE: (f32, f32) = (0.0, 5.0);
pub const SINKING_RANGE: (f32, f32) = (-5.0, 5.0);

fn voltage_arg(v: f32) -> String {
    cell_value(v, VOLTAGE_RANGE.0, VOLTAGE_RANGE.1)
}

fn sourcing_arg(v: f32) -> String {
    cell_value(v, SOURCING_RANGE.0, SOURCING_RANGE.1)
}

fn sinking_arg(v: f32) -> String {
    cell_value(v, SINKING_RANGE.0, SINKING_RANGE.1)
}

fn bool_arg(en: bool) -> String {
    scpi::bool_arg(en).to_string()
}

impl ScpiClient {
    // Enable state

    pub fn enable_cell(&self, cell: usize, en: bool) -> Result<()> {
        self.set_channel(ENABLE, cell, CELL_COUNT, &bool_arg(en))
    }

    pub fn enable_all_cells(&self, en: bool) -> Result<()> {
        self.set_all_channels(ENABLE, CELL_COUNT, &bool_arg(en))
    }

    /// Enables or disables the cells whose bit is set in `cells`. Bits past
    /// the last cell are ignored, and an empty mask sends nothing.
    pub fn enable_cells_masked(&self, cells: u32, en: bool) -> Result<()> {
        self.set_masked_channels(ENABLE, cells, CELL_COUNT, &bool_arg(en))
    }

    pub fn get_cell_enabled(&self, cell: usize) -> Result<bool> {
        self.get_channel(ENABLE, cell, CELL_COUNT, scpi::parse_bool)
    }

    pub fn get_all_cells_enabled(&self) -> Result<[bool; CELL_COUNT]> {
        self.get_all_channels(ENABLE, scpi::parse_bool)
    }

    /// Enable state of every cell as a bitmask, cell 0 in bit 0.
    pub fn get_all_cells_enabled_masked(&self) -> Result<u32> {
        self.get_all_cells_enabled().map(|states| flags_to_mask(&states))
    }

    // Voltage setpoint

    pub fn set_cell_voltage(&self, cell: usize, voltage: f32) -> Result<()> {
        self.set_channel(VOLTAGE, cell, CELL_COUNT, &voltage_arg(voltage))
    }

    pub fn set_all_cell_voltage(&self, voltage: f32) -> Result<()> {
        self.set_all_channels(VOLTAGE, CELL_COUNT, &voltage_arg(voltage))
    }

    pub fn set_cell_voltage_masked(&self, cells: u32, voltage: f32) -> Result<()> {
        self.set_masked_channels(VOLTAGE, cells, CELL_COUNT, &voltage_arg(voltage))
    }

    /// Sets cells `0..voltages.len()` in a single transmission.
    pub fn set_cell_voltages(&self, voltages: &[f32]) -> Result<()> {
        self.set_each_channel(VOLTAGE, voltages, CELL_COUNT, voltage_arg)
    }

    pub fn get_cell_voltage_target(&self, cell: usize) -> Result<f32> {
        self.get_channel(VOLTAGE, cell, CELL_COUNT, scpi::parse_float)
    }

    pub fn get_all_cell_voltage_targets(&self) -> Result<[f32; CELL_COUNT]> {
        self.get_all_channels(VOLTAGE, scpi::parse_float)
    }

    pub fn read_cell_voltage_targets(&self, out: &mut [f32]) -> Result<()> {
        self.get_channels_into(VOLTAGE, out, CELL_COUNT, scpi::parse_float)
    }

    // Sourcing current limit

    pub fn set_cell_sourcing(&self, cell: usize, limit: f32) -> Result<()> {
        self.set_channel(SOURCING, cell, CELL_COUNT, &sourcing_arg(limit))
    }

    pub fn set_all_cell_sourcing(&self, limit: f32) -> Result<()> {
        self.set_all_channels(SOURCING, CELL_COUNT, &sourcing_arg(limit))
    }

    pub fn set_cell_sourcing_masked(&self, cells: u32, limit: f32) -> Result<()> {
        self.set_masked_channels(SOURCING, cells, CELL_COUNT, &sourcing_arg(limit))
    }

    pub fn set_cell_sourcing_limits(&self, limits: &[f32]) -> Result<()> {
        self.set_each_channel(SOURCING, limits, CELL_COUNT, sourcing_arg)
    }

    pub fn get_cell_sourcing_limit(&self, cell: usize) -> Result<f32> {
        self.get_channel(SOURCING, cell, CELL_COUNT, scpi::parse_float)
    }

    pub fn get_all_cell_sourcing_limits(&self) -> Result<[f32; CELL_COUNT]> {
        self.get_all_channels(SOURCING, scpi::parse_float)
    }

    pub fn read_cell_sourcing_limits(&self, out: &mut [f32]) -> Result<()> {
        self.get_channels_into(SOURCING, out, CELL_COUNT, scpi::parse_float)
    }

    // Sinking current limit

    pub fn set_cell_sinking(&self, cell: usize, limit: f32) -> Result<()> {
        self.set_channel(SINKING, cell, CELL_COUNT, &sinking_arg(limit))
    }

    pub fn set_all_cell_sinking(&self, limit: f32) -> Result<()> {
        self.set_all_channels(SINKING, CELL_COUNT, &sinking_arg(limit))
    }

    pub fn set_cell_sinking_masked(&self, cells: u32, limit: f32) -> Result<()> {
        self.set_masked_channels(SINKING, cells, CELL_COUNT, &sinking_arg(limit))
    }

    pub fn set_cell_sinking_limits(&self, limits: &[f32]) -> Result<()> {
        self.set_each_channel(SINKING, limits, CELL_COUNT, sinking_arg)
    }

    pub fn get_cell_sinking_limit(&self, cell: usize) -> Result<f32> {
        self.get_channel(SINKING, cell, CELL_COUNT, scpi::parse_float)
    }

    pub fn get_all_cell_sinking_limits(&self) -> Result<[f32; CELL_COUNT]> {
        self.get_all_channels(SINKING, scpi::parse_float)
    }

    pub fn read_cell_sinking_limits(&self, out: &mut [f32]) -> Result<()> {
        self.get_channels_into(SINKING, out, CELL_COUNT, scpi::parse_float)
    }

    // Fault injection

    pub fn set_cell_fault(&self, cell: usize, fault: CellFault) -> Result<()> {
        self.set_channel(FAULT, cell, CELL_COUNT, fault.command_token())
    }

    pub fn set_all_cell_fault(&self, fault: CellFault) -> Result<()> {
        self.set_all_channels(FAULT, CELL_COUNT, fault.command_token())
    }

    pub fn set_cell_fault_masked(&self, cells: u32, fault: CellFault) -> Result<()> {
        self.set_masked_channels(FAULT, cells, CELL_COUNT, fault.command_token())
    }

    pub fn set_cell_faults(&self, faults: &[CellFault]) -> Result<()> {
        self.set_each_channel(FAULT, faults, CELL_COUNT, |f| f.command_token().to_string())
    }

    pub fn get_cell_fault(&self, cell: usize) -> Result<CellFault> {
        self.get_channel(FAULT, cell, CELL_COUNT, CellFault::parse_token)
    }

    pub fn get_all_cell_faults(&self) -> Result<[CellFault; CELL_COUNT]> {
        self.get_all_channels(FAULT, CellFault::parse_token)
    }

    pub fn read_cell_faults(&self, out: &mut [CellFault]) -> Result<()> {
        self.get_channels_into(FAULT, out, CELL_COUNT, CellFault::parse_token)
    }

    // Current sense range

    pub fn set_cell_sense_range(&self, cell: usize, range: CellSenseRange) -> Result<()> {
        self.set_channel(SENSE_RANGE, cell, CELL_COUNT, range.command_token())
    }

    pub fn set_all_cell_sense_range(&self, range: CellSenseRange) -> Result<()> {
        self.set_all_channels(SENSE_RANGE, CELL_COUNT, range.command_token())
    }

    pub fn set_cell_sense_range_masked(&self, cells: u32, range: CellSenseRange) -> Result<()> {
        self.set_masked_channels(SENSE_RANGE, cells, CELL_COUNT, range.command_token())
    }

    pub fn set_cell_sense_ranges(&self, ranges: &[CellSenseRange]) -> Result<()> {
        self.set_each_channel(SENSE_RANGE, ranges, CELL_COUNT, |r| r.command_token().to_string())
    }

    pub fn get_cell_sense_range(&self, cell: usize) -> Result<CellSenseRange> {
        self.get_channel(SENSE_RANGE, cell, CELL_COUNT, CellSenseRange::parse_token)
    }

    pub fn get_all_cell_sense_ranges(&self) -> Result<[CellSenseRange; CELL_COUNT]> {
        self.get_all_channels(SENSE_RANGE, CellSenseRange::parse_token)
    }

    pub fn read_cell_sense_ranges(&self, out: &mut [CellSenseRange]) -> Result<()> {
        self.get_channels_into(SENSE_RANGE, out, CELL_COUNT, CellSenseRange::parse_token)
    }

    // Measurement precision, shared by every cell

    pub fn set_cell_precision_mode(&self, mode: CellPrecisionMode) -> Result<()> {
        self.send(&format!("CONF:MEAS:MODE {}{}", mode.command_token(), scpi::TERMINATOR))
    }

    pub fn get_cell_precision_mode(&self) -> Result<CellPrecisionMode> {
        let reply = self.query("CONF:MEAS:MODE?\r\n")?;
        CellPrecisionMode::parse_token(&reply)
    }

    // Measurements

    pub fn measure_cell_voltage(&self, cell: usize) -> Result<f32> {
        self.get_channel(MEASURED_VOLTAGE, cell, CELL_COUNT, scpi::parse_float)
    }

    pub fn measure_all_cell_voltages(&self) -> Result<[f32; CELL_COUNT]> {
        self.get_all_channels(MEASURED_VOLTAGE, scpi::parse_float)
    }

    pub fn read_cell_voltages(&self, out: &mut [f32]) -> Result<()> {
        self.get_channels_into(MEASURED_VOLTAGE, out, CELL_COUNT, scpi::parse_float)
    }

    pub fn measure_cell_current(&self, cell: usize) -> Result<f32> {
        self.get_channel(MEASURED_CURRENT, cell, CELL_COUNT, scpi::parse_float)
    }

    pub fn measure_all_cell_currents(&self) -> Result<[f32; CELL_COUNT]> {
        self.get_all_channels(MEASURED_CURRENT, scpi::parse_float)
    }

    pub fn read_cell_currents(&self, out: &mut [f32]) -> Result<()> {
        self.get_channels_into(MEASURED_CURRENT, out, CELL_COUNT, scpi::parse_float)
    }

    /// Voltage averaged by the unit over its rolling filter window.
    pub fn measure_average_cell_voltage(&self, cell: usize) -> Result<f32> {
        self.get_channel(AVERAGE_VOLTAGE, cell, CELL_COUNT, scpi::parse_float)
    }

    pub fn measure_all_average_cell_voltages(&self) -> Result<[f32; CELL_COUNT]> {
        self.get_all_channels(AVERAGE_VOLTAGE, scpi::parse_float)
    }

    pub fn read_average_cell_voltages(&self, out: &mut [f32]) -> Result<()> {
        self.get_channels_into(AVERAGE_VOLTAGE, out, CELL_COUNT, scpi::parse_float)
    }

    pub fn measure_average_cell_current(&self, cell: usize) -> Result<f32> {
        self.get_channel(AVERAGE_CURRENT, cell, CELL_COUNT, scpi::parse_float)
    }

    pub fn measure_all_average_cell_currents(&self) -> Result<[f32; CELL_COUNT]> {
        self.get_all_channels(AVERAGE_CURRENT, scpi::parse_float)
    }

    pub fn read_average_cell_currents(&self, out: &mut [f32]) -> Result<()> {
        self.get_channels_into(AVERAGE_CURRENT, out, CELL_COUNT, scpi::parse_float)
    }

    // Operating mode

    pub fn get_cell_operating_mode(&self, cell: usize) -> Result<CellMode> {
        self.get_channel(OPERATING_MODE, cell, CELL_COUNT, CellMode::parse_token)
    }

    pub fn get_all_cell_operating_modes(&self) -> Result<[CellMode; CELL_COUNT]> {
        self.get_all_channels(OPERATING_MODE, CellMode::parse_token)
    }

    pub fn read_cell_operating_modes(&self, out: &mut [CellMode]) -> Result<()> {
        self.get_channels_into(OPERATING_MODE, out, CELL_COUNT, CellMode::parse_token)
    }
}
