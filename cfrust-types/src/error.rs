//! Payload validation and parse errors

use cfrust_core::ErrorCode;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{field} out of range: {value} (allowed {min}..={max})")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Truncated {what}: need {needed} bytes, got {actual}")]
    Truncated {
        what: &'static str,
        needed: usize,
        actual: usize,
    },
}

impl Error {
    /// Host-facing code of this error
    ///
    /// Bad arguments are parameter errors; bad device data is a response
    /// format error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) | Self::OutOfRange { .. } => ErrorCode::CmdParamErr,
            Self::Parse(_) | Self::Truncated { .. } => ErrorCode::CmdRespFormatErr,
        }
    }

    pub(crate) fn out_of_range(field: &'static str, value: impl Into<i64>, min: i64, max: i64) -> Self {
        Self::OutOfRange {
            field,
            value: value.into(),
            min,
            max,
        }
    }
}

/// Fail with [`Error::Truncated`] unless `data` holds at least `needed` bytes
pub(crate) fn ensure_len(what: &'static str, data: &[u8], needed: usize) -> Result<()> {
    if data.len() < needed {
        return Err(Error::Truncated {
            what,
            needed,
            actual: data.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(Error::Validation("x".into()).code(), ErrorCode::CmdParamErr);
        assert_eq!(Error::out_of_range("power", 40u8, 0, 33).code(), ErrorCode::CmdParamErr);
        assert_eq!(
            Error::Truncated { what: "tag report", needed: 9, actual: 3 }.code(),
            ErrorCode::CmdRespFormatErr
        );
    }

    #[test]
    fn test_ensure_len() {
        assert!(ensure_len("x", &[1, 2], 2).is_ok());
        assert_eq!(
            ensure_len("x", &[1], 2),
            Err(Error::Truncated { what: "x", needed: 2, actual: 1 })
        );
    }
}
