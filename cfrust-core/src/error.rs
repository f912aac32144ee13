//! Error types for cfrust-core

use crate::command::{Command, ProtocolFamily, Scope};
use crate::status::ErrorCode;

/// Result type alias for cfrust operations
pub type Result<T> = std::result::Result<T, Error>;

/// Framing failures reported by the frame codec
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// Buffer ends before the declared frame does; keep reading
    #[error("Incomplete frame: need {needed} more bytes")]
    Incomplete {
        needed: usize,
    },

    /// First byte is not the frame head
    #[error("Bad frame header: 0x{0:02X}")]
    BadHeader(u8),

    /// Declared length disagrees with the bytes present or the frame kind
    #[error("Length mismatch: declared {declared}, actual {actual}")]
    LengthMismatch {
        declared: usize,
        actual: usize,
    },

    /// CRC verification failed
    #[error("CRC mismatch: expected 0x{expected:04X}, received 0x{received:04X}")]
    CrcMismatch {
        expected: u16,
        received: u16,
    },
}

impl FrameError {
    /// Everything except `Incomplete` ends the current transaction
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Incomplete { .. })
    }

    /// Host-facing code for this framing failure
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::CrcMismatch { .. } => ErrorCode::CmdRespCrcErr,
            _ => ErrorCode::CmdRespFormatErr,
        }
    }
}

/// Core protocol errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Frame could not be decoded
    #[error("Framing error: {0}")]
    Frame(#[from] FrameError),

    /// Request payload larger than the field allows
    #[error("Invalid payload: {size} bytes (max: {max} bytes)")]
    InvalidPayload {
        size: usize,
        max: usize,
    },

    /// Opcode not registered in the given scope
    #[error("Unknown opcode 0x{opcode:04X} in {scope} scope")]
    UnknownOpcode {
        opcode: u16,
        scope: Scope,
    },

    /// Logical command has no opcode in the active protocol family
    #[error("{command:?} is not supported in {family} mode")]
    Unsupported {
        command: Command,
        family: ProtocolFamily,
    },

    /// Command may be classified but not executed
    #[error("Opcode 0x{0:04X} is classification-only")]
    NotExecutable(u16),

    /// Response payload does not match the command's expected shape
    #[error("Unexpected response payload for {command}: {len} bytes")]
    ResponseFormat {
        command: &'static str,
        len: usize,
    },

    /// Invalid inventory session state
    #[error("Invalid session state: {0}")]
    InvalidSessionState(String),

    /// 32-bit value outside the defined code set
    #[error("Unknown error code: 0x{0:08X}")]
    UnknownErrorCode(u32),
}

impl Error {
    /// Host-facing code of this error
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Frame(e) => e.code(),
            Self::InvalidPayload { .. } => ErrorCode::CmdParamErr,
            Self::UnknownOpcode { .. } | Self::Unsupported { .. } | Self::NotExecutable(_) => {
                ErrorCode::CmdParamErr
            }
            Self::ResponseFormat { .. } => ErrorCode::CmdRespFormatErr,
            Self::InvalidSessionState(_) => ErrorCode::DllInnerFailed,
            Self::UnknownErrorCode(_) => ErrorCode::DllInnerFailed,
        }
    }
}
