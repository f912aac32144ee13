//! High-level error types

use cfrust_core::{ErrorCode, FrameError};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Core protocol error: {0}")]
    Core(#[from] cfrust_core::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] cfrust_transport::Error),

    #[error("Type error: {0}")]
    Types(#[from] cfrust_types::Error),

    /// Reader or tag answered with a non-success status
    #[error("Device returned {0}")]
    Device(ErrorCode),

    /// Deadline passed with part of a frame buffered
    #[error("Incomplete response: {buffered} bytes buffered at deadline")]
    IncompleteResponse {
        buffered: usize,
    },

    /// Operation not allowed in the current inventory state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Inventory stopped locally but the reader did not confirm it
    #[error("Inventory stop not acknowledged: {0}")]
    StopUnacknowledged(ErrorCode),
}

impl From<FrameError> for Error {
    fn from(e: FrameError) -> Self {
        Self::Core(cfrust_core::Error::Frame(e))
    }
}

impl Error {
    /// Host-facing code of this error
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Core(e) => e.code(),
            Self::Transport(e) => e.code(),
            Self::Types(e) => e.code(),
            Self::Device(code) | Self::StopUnacknowledged(code) => *code,
            Self::IncompleteResponse { .. } => ErrorCode::CmdRespFormatErr,
            Self::InvalidState(_) => ErrorCode::DllInnerFailed,
        }
    }

    /// Reported for information; the operation's effect still took place
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::StopUnacknowledged(_))
    }

    /// The reader did not answer within the deadline
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(cfrust_transport::Error::ReadTimeout))
    }
}
