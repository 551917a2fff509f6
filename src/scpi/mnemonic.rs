//! Keyword tables for the cell enums.
//!
//! The unit accepts short keywords in commands but answers queries with the
//! long form, so sending and parsing use separate tables. Only `CellMode`
//! uses the same spelling in both directions.

use super::trim;
use crate::error::{ErrorCode, Result};
use crate::types::{CellFault, CellMode, CellPrecisionMode, CellSenseRange};

pub trait Mnemonic: Sized + Copy + PartialEq + 'static {
    /// Keyword to place in a command.
    fn command_token(self) -> &'static str;

    /// Keywords the unit uses in replies.
    const REPLY_TOKENS: &'static [(&'static str, Self)];

    /// Parses a single reply keyword. Matching is exact after trimming.
    fn parse_token(text: &str) -> Result<Self> {
        let text = trim(text);
        Self::REPLY_TOKENS
            .iter()
            .find(|(token, _)| *token == text)
            .map(|&(_, value)| value)
            .ok_or(ErrorCode::InvalidResponse)
    }

    /// Keyword the unit uses in replies for this value.
    fn reply_token(self) -> &'static str {
        Self::REPLY_TOKENS
            .iter()
            .find(|(_, value)| *value == self)
            .map(|&(token, _)| token)
            .unwrap_or_default()
    }
}

impl Mnemonic for CellFault {
    fn command_token(self) -> &'static str {
        match self {
            CellFault::None => "NONE",
            CellFault::OpenCircuit => "OPEN",
            CellFault::ShortCircuit => "SHORT",
            CellFault::Polarity => "POL",
        }
    }

    const REPLY_TOKENS: &'static [(&'static str, Self)] = &[
        ("NONE", CellFault::None),
        ("OPENCIRCUIT", CellFault::OpenCircuit),
        ("SHORTCIRCUIT", CellFault::ShortCircuit),
        ("POLARITY", CellFault::Polarity),
    ];
}

impl Mnemonic for CellSenseRange {
    fn command_token(self) -> &'static str {
        match self {
            CellSenseRange::Auto => "AUTO",
            CellSenseRange::Low => "LO",
            CellSenseRange::High => "HI",
        }
    }

    const REPLY_TOKENS: &'static [(&'static str, Self)] = &[
        ("AUTO", CellSenseRange::Auto),
        ("LOW", CellSenseRange::Low),
        ("HIGH", CellSenseRange::High),
    ];
}

impl Mnemonic for CellPrecisionMode {
    fn command_token(self) -> &'static str {
        match self {
            CellPrecisionMode::Normal => "NORM",
            CellPrecisionMode::HighPrecision => "PREC",
            CellPrecisionMode::NoiseRejection => "FILT",
        }
    }

    const REPLY_TOKENS: &'static [(&'static str, Self)] = &[
        ("NORMAL", CellPrecisionMode::Normal),
        ("PRECISION", CellPrecisionMode::HighPrecision),
        ("FILTER", CellPrecisionMode::NoiseRejection),
    ];
}

impl Mnemonic for CellMode {
    fn command_token(self) -> &'static str {
        match self {
            CellMode::ConstantVoltage => "CV",
            CellMode::CurrentLimited => "ILIM",
        }
    }

    const REPLY_TOKENS: &'static [(&'static str, Self)] = &[
        ("CV", CellMode::ConstantVoltage),
        ("ILIM", CellMode::CurrentLimited),
    ];
}
