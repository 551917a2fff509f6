use std::fmt;

use serde::{Deserialize, Serialize};

/// Raw value reported for a successful call at the integer boundary.
pub const SUCCESS: i32 = 0;

/// Every failure the driver can report. `Display` gives the same text as
/// [`error_message`].
///
/// The discriminants are the raw codes handed across the integer boundary, so
/// they must never be renumbered. Zero is reserved for success and is not a
/// variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
#[repr(i32)]
pub enum ErrorCode {
    ChannelIndexOutOfRange = -1,
    InvalidIPAddress = -2,
    ConnectionTimedOut = -3,
    ConnectionFailed = -4,
    SendFailed = -5,
    SendTimedOut = -6,
    ReadFailed = -7,
    ReadTimedOut = -8,
    NotConnected = -9,
    AddressResolutionFailed = -10,
    InvalidResponse = -11,
    InvalidFaultType = -12,
    InvalidSenseRange = -13,
    InvalidArgument = -14,
    InvalidDriverHandle = -15,
    ReceiveNotAllowed = -16,
    AlreadyConnected = -17,
    SocketError = -18,
    FailedToBindSocket = -19,
    OpeningSerialPortFailed = -20,
    FailedToConfigurePort = -21,
    FailedToJoinGroup = -22,
    BufferTooSmall = -23,
    InvalidPrecisionMode = -24,

    /// Only produced by integer-boundary wrappers.
    AllocationFailed = -25,

    /// Only produced by integer-boundary wrappers.
    UnexpectedException = -26,
}

pub type Result<T> = std::result::Result<T, ErrorCode>;

impl ErrorCode {
    pub const ALL: [ErrorCode; 26] = [
        ErrorCode::ChannelIndexOutOfRange,
        ErrorCode::InvalidIPAddress,
        ErrorCode::ConnectionTimedOut,
        ErrorCode::ConnectionFailed,
        ErrorCode::SendFailed,
        ErrorCode::SendTimedOut,
        ErrorCode::ReadFailed,
        ErrorCode::ReadTimedOut,
        ErrorCode::NotConnected,
        ErrorCode::AddressResolutionFailed,
        ErrorCode::InvalidResponse,
        ErrorCode::InvalidFaultType,
        ErrorCode::InvalidSenseRange,
        ErrorCode::InvalidArgument,
        ErrorCode::InvalidDriverHandle,
        ErrorCode::ReceiveNotAllowed,
        ErrorCode::AlreadyConnected,
        ErrorCode::SocketError,
        ErrorCode::FailedToBindSocket,
        ErrorCode::OpeningSerialPortFailed,
        ErrorCode::FailedToConfigurePort,
        ErrorCode::FailedToJoinGroup,
        ErrorCode::BufferTooSmall,
        ErrorCode::InvalidPrecisionMode,
        ErrorCode::AllocationFailed,
        ErrorCode::UnexpectedException,
    ];

    /// Raw negative code for the integer boundary.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// True for the codes that mean "the operation did not finish in time".
    pub fn is_timeout(self) -> bool {
        matches!(
            self,
            ErrorCode::ConnectionTimedOut | ErrorCode::SendTimedOut | ErrorCode::ReadTimedOut
        )
    }
}

impl TryFrom<i32> for ErrorCode {
    type Error = i32;

    /// Fails with the input value for success and for unknown codes.
    fn try_from(raw: i32) -> std::result::Result<Self, Self::Error> {
        ErrorCode::ALL
            .iter()
            .copied()
            .find(|ec| ec.code() == raw)
            .ok_or(raw)
    }
}

impl From<ErrorCode> for i32 {
    fn from(ec: ErrorCode) -> Self {
        ec.code()
    }
}

/// Human-readable text for a raw boundary code, including success.
pub fn error_message(raw: i32) -> &'static str {
    if raw == SUCCESS {
        return "Success";
    }
    match ErrorCode::try_from(raw) {
        Ok(ec) => ec.message(),
        Err(_) => "Unknown error",
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl ErrorCode {
    fn message(self) -> &'static str {
        match self {
            ErrorCode::ChannelIndexOutOfRange => "Channel index out of range",
            ErrorCode::InvalidIPAddress => "Invalid IP address",
            ErrorCode::ConnectionTimedOut => "Connection timed out",
            ErrorCode::ConnectionFailed => "Connection failed",
            ErrorCode::SendFailed => "Send failed",
            ErrorCode::SendTimedOut => "Send timed out",
            ErrorCode::ReadFailed => "Read failed",
            ErrorCode::ReadTimedOut => "Read timed out",
            ErrorCode::NotConnected => "Not connected",
            ErrorCode::AddressResolutionFailed => "Address resolution failed",
            ErrorCode::InvalidResponse => "Invalid response received from the unit",
            ErrorCode::InvalidFaultType => "Invalid fault type",
            ErrorCode::InvalidSenseRange => "Invalid sense range",
            ErrorCode::InvalidArgument => "Invalid argument",
            ErrorCode::InvalidDriverHandle => "Invalid driver handle",
            ErrorCode::ReceiveNotAllowed => "Receiving not supported by driver",
            ErrorCode::AlreadyConnected => "Already connected",
            ErrorCode::SocketError => "Unexpected socket error",
            ErrorCode::FailedToBindSocket => "Failed to bind socket",
            ErrorCode::OpeningSerialPortFailed => "Failed to open serial port",
            ErrorCode::FailedToConfigurePort => "Failed to configure port",
            ErrorCode::FailedToJoinGroup => "Failed to join multicast group",
            ErrorCode::BufferTooSmall => "Insufficient buffer size",
            ErrorCode::InvalidPrecisionMode => "Invalid cell precision mode",
            ErrorCode::AllocationFailed => "Memory allocation failed",
            ErrorCode::UnexpectedException => "Unexpected internal error",
        }
    }
}
