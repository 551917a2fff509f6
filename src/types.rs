use serde::{Deserialize, Serialize};

use crate::error::ErrorCode;

/// Total cell count.
pub const CELL_COUNT: usize = 8;
/// Auxiliary analog output count.
pub const ANALOG_OUTPUT_COUNT: usize = 8;
/// Auxiliary analog input count.
pub const ANALOG_INPUT_COUNT: usize = 8;
/// Auxiliary digital output count.
pub const DIGITAL_OUTPUT_COUNT: usize = 4;
/// Auxiliary digital input count.
pub const DIGITAL_INPUT_COUNT: usize = 4;
/// Model global input count.
pub const GLOBAL_MODEL_INPUT_COUNT: usize = 8;
/// Model local input count.
pub const LOCAL_MODEL_INPUT_COUNT: usize = 8;
/// Model output count.
pub const MODEL_OUTPUT_COUNT: usize = 36;

/// Alarm bits reported by the unit's alarm register.
pub mod alarms {
    /// Alarms the host may clear.
    pub const RECOVERABLE_MASK: u32 = 0x0000FF;
    /// Alarms that disable a subset of cells.
    pub const CRITICAL_MASK: u32 = 0x00FF00;
    /// Alarms that disable every cell.
    pub const FATAL_MASK: u32 = 0xFF0000;

    pub const SOFT_INTERLOCK: u32 = 0x000001;

    /// Cells 1 and 2 disabled.
    pub const FAN0_FAULT: u32 = 0x000100;
    /// Cells 3 and 4 disabled.
    pub const FAN1_FAULT: u32 = 0x000200;
    /// Cells 5 and 6 disabled.
    pub const FAN2_FAULT: u32 = 0x000400;
    /// Cells 7 and 8 disabled.
    pub const FAN3_FAULT: u32 = 0x000800;

    pub const FAN4_FAULT: u32 = 0x010000;
    pub const HARDWARE_FAULT: u32 = 0x020000;
}

/// Fault injected on a cell output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellFault {
    None,
    OpenCircuit,
    ShortCircuit,
    Polarity,
}

/// Current sense range. The unit powers up in `Auto`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellSenseRange {
    Auto,
    /// 1 A range.
    Low,
    /// 5 A range.
    High,
}

/// Operating mode a cell reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellMode {
    ConstantVoltage,
    CurrentLimited,
}

/// Measurement precision, shared by all cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellPrecisionMode {
    Normal,
    HighPrecision,
    NoiseRejection,
}

// Raw discriminants used at the integer boundary.

impl TryFrom<i32> for CellFault {
    type Error = ErrorCode;

    fn try_from(raw: i32) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(CellFault::None),
            1 => Ok(CellFault::OpenCircuit),
            2 => Ok(CellFault::ShortCircuit),
            3 => Ok(CellFault::Polarity),
            _ => Err(ErrorCode::InvalidFaultType),
        }
    }
}

impl TryFrom<i32> for CellSenseRange {
    type Error = ErrorCode;

    fn try_from(raw: i32) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(CellSenseRange::Auto),
            1 => Ok(CellSenseRange::Low),
            2 => Ok(CellSenseRange::High),
            _ => Err(ErrorCode::InvalidSenseRange),
        }
    }
}

impl TryFrom<i32> for CellMode {
    type Error = ErrorCode;

    fn try_from(raw: i32) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(CellMode::ConstantVoltage),
            1 => Ok(CellMode::CurrentLimited),
            _ => Err(ErrorCode::InvalidArgument),
        }
    }
}

impl TryFrom<i32> for CellPrecisionMode {
    type Error = ErrorCode;

    fn try_from(raw: i32) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(CellPrecisionMode::Normal),
            1 => Ok(CellPrecisionMode::HighPrecision),
            2 => Ok(CellPrecisionMode::NoiseRejection),
            _ => Err(ErrorCode::InvalidPrecisionMode),
        }
    }
}

/// Identity reported by `*IDN?`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub part_number: String,
    pub serial: String,
    pub version: String,
}

/// Ethernet address configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EthernetConfig {
    pub ip: String,
    pub netmask: String,
}

/// Entry popped from the unit's error queue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScpiError {
    pub code: i16,
    pub message: String,
}

impl ScpiError {
    /// The unit reports `0,"No error"` once the queue is drained.
    pub fn is_no_error(&self) -> bool {
        self.code == 0
    }
}

/// Name and version of the model loaded on the unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    pub version: String,
}
