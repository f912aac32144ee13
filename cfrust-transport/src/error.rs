//! Transport errors

use std::io;

use cfrust_core::ErrorCode;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Not connected")]
    NotConnected,

    #[error("Already connected")]
    AlreadyConnected,

    #[error("Connection timeout")]
    ConnectionTimeout,

    #[error("Read timeout")]
    ReadTimeout,

    #[error("Connection closed by remote")]
    ConnectionClosed,

    #[error("Failed to open {port}: {reason}")]
    PortOpen {
        port: String,
        reason: String,
    },

    #[error("Write failed: {0}")]
    Write(#[source] io::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}

impl Error {
    /// Host-facing code of this error
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotConnected => ErrorCode::DllUnconnect,
            Self::AlreadyConnected | Self::InvalidAddress(_) => ErrorCode::PortHandleErr,
            Self::ConnectionTimeout | Self::PortOpen { .. } => ErrorCode::PortOpenFailed,
            Self::ReadTimeout => ErrorCode::CmdCommTimeout,
            Self::ConnectionClosed => ErrorCode::DllDisconnect,
            Self::Write(_) => ErrorCode::CmdCommWriteFailed,
            Self::Io(_) => ErrorCode::CmdCommReadFailed,
        }
    }

    /// The link is gone and must be reopened
    pub fn is_disconnect(&self) -> bool {
        match self {
            Self::NotConnected | Self::ConnectionClosed => true,
            Self::Write(e) | Self::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::BrokenPipe
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::NotConnected
            ),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(Error::ReadTimeout.code(), ErrorCode::CmdCommTimeout);
        assert_eq!(Error::NotConnected.code(), ErrorCode::DllUnconnect);
        assert_eq!(Error::ConnectionClosed.code(), ErrorCode::DllDisconnect);
        assert_eq!(
            Error::Write(io::Error::other("boom")).code(),
            ErrorCode::CmdCommWriteFailed
        );
        assert_eq!(
            Error::PortOpen { port: "/dev/ttyUSB9".into(), reason: "missing".into() }.code(),
            ErrorCode::PortOpenFailed
        );
    }

    #[test]
    fn test_disconnect_detection() {
        assert!(Error::ConnectionClosed.is_disconnect());
        assert!(Error::Io(io::Error::from(io::ErrorKind::BrokenPipe)).is_disconnect());
        assert!(!Error::ReadTimeout.is_disconnect());
    }
}
