//! Host-facing error codes and status byte classification
//!
//! The reader answers every command with a one-byte status. Callers never see
//! those bytes directly: they are mapped into a closed set of 32-bit codes
//! split into three bands.
//!
//! ```text
//! 0x00000000              success
//! 0xFFFFFF01..=0xFFFFFF23 transport / command / reader-level errors
//! 0xFFFFFF40..=0xFFFFFF46 GB/T 29768 tag errors
//! 0xFFFFFF50..=0xFFFFFF5D ISO 18000-6C tag errors
//! ```

use std::fmt;

use crate::error::{Error, Result};

/// Reader status vocabulary (generic responses)
pub mod reader_status {
    pub const OK: u8 = 0x00;
    pub const PARAM_ERR: u8 = 0x01;
    pub const OPR_ERR: u8 = 0x02;
    pub const SERIAL_NUM_ERR: u8 = 0x03;
    pub const INVENT_END: u8 = 0x12;
    pub const TAG_NO_RESP: u8 = 0x14;
    pub const TAG_CRC_ERR: u8 = 0x15;
    pub const AUTH_FAILED: u8 = 0x16;
    pub const TAG_PWD_ERR: u8 = 0x17;
    pub const SAM_NO_RESP: u8 = 0x21;
    pub const SAM_OPRT_ERR: u8 = 0x22;
    pub const NOMORE_DATA: u8 = 0xFF;
}

/// GB tag status vocabulary
pub mod gb_status {
    pub const OPR_LIMIT: u8 = 0x81;
    pub const MEM_OVF: u8 = 0x82;
    pub const LOW_POWER: u8 = 0x83;
    pub const MEM_LCK: u8 = 0x85;
    pub const PWD_ERR: u8 = 0x86;
    pub const AUTH_FAIL: u8 = 0x87;
    pub const UNKNW_ERR: u8 = 0x88;
}

/// ISO tag status vocabulary
pub mod iso_status {
    pub const OTHER_ERR: u8 = 0x00;
    pub const NOT_SUPPORT: u8 = 0x01;
    pub const OPR_LIMIT: u8 = 0x02;
    pub const MEM_OVF: u8 = 0x03;
    pub const MEM_LCK: u8 = 0x04;
    pub const CRYPTO_ERR: u8 = 0x05;
    pub const NOT_ENCAP: u8 = 0x06;
    pub const RESP_OVF: u8 = 0x07;
    pub const SEC_TIMEOUT: u8 = 0x08;
    pub const LOW_POWER: u8 = 0x0B;
    pub const SENSOR_CFG: u8 = 0x81;
    pub const TAG_BUSY: u8 = 0x82;
    pub const MEASU_NOT_SUPPORT: u8 = 0x83;
    pub const UNKNW_ERR: u8 = 0x88;
}

/// Host-facing error code
///
/// This is the contract callers code against. New codes must stay inside
/// their band.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ErrorCode {
    Ok = 0x0000_0000,

    // Reader band
    PortHandleErr = 0xFFFF_FF01,
    PortOpenFailed = 0xFFFF_FF02,
    DllInnerFailed = 0xFFFF_FF03,
    CmdParamErr = 0xFFFF_FF04,
    CmdSerialNumExist = 0xFFFF_FF05,
    CmdInnerErr = 0xFFFF_FF06,
    CmdInventoryStop = 0xFFFF_FF07,
    CmdTagNoResp = 0xFFFF_FF08,
    CmdDecodeTagDataFail = 0xFFFF_FF09,
    CmdCodeOverflow = 0xFFFF_FF0A,
    CmdAuthFail = 0xFFFF_FF0B,
    CmdPwdErr = 0xFFFF_FF0C,
    CmdSamNoResp = 0xFFFF_FF0D,
    CmdSamCmdFail = 0xFFFF_FF0E,
    CmdRespFormatErr = 0xFFFF_FF0F,
    CmdHasMoreData = 0xFFFF_FF10,
    CmdBufOverflow = 0xFFFF_FF11,
    CmdCommTimeout = 0xFFFF_FF12,
    CmdCommWriteFailed = 0xFFFF_FF13,
    CmdCommReadFailed = 0xFFFF_FF14,
    CmdNoMoreData = 0xFFFF_FF15,
    DllUnconnect = 0xFFFF_FF16,
    DllDisconnect = 0xFFFF_FF17,
    CmdRespCrcErr = 0xFFFF_FF18,
    CmdIapCrcErr = 0xFFFF_FF21,
    CmdDownloadErr = 0xFFFF_FF22,
    CmdDownloadNoneErr = 0xFFFF_FF23,

    // GB tag band
    GbTagLowPower = 0xFFFF_FF40,
    GbTagOprLimit = 0xFFFF_FF41,
    GbTagMemOvf = 0xFFFF_FF42,
    GbTagMemLck = 0xFFFF_FF43,
    GbTagPwdErr = 0xFFFF_FF44,
    GbTagAuthFail = 0xFFFF_FF45,
    GbTagUnknownErr = 0xFFFF_FF46,

    // ISO tag band
    IsoTagOtherErr = 0xFFFF_FF50,
    IsoTagNotSupport = 0xFFFF_FF51,
    IsoTagOprLimit = 0xFFFF_FF52,
    IsoTagMemOvf = 0xFFFF_FF53,
    IsoTagMemLck = 0xFFFF_FF54,
    IsoTagCryptoErr = 0xFFFF_FF55,
    IsoTagNotEncap = 0xFFFF_FF56,
    IsoTagRespOvf = 0xFFFF_FF57,
    IsoTagSecTimeout = 0xFFFF_FF58,
    IsoTagLowPower = 0xFFFF_FF59,
    IsoTagUnknownErr = 0xFFFF_FF5A,
    IsoTagSensorCfg = 0xFFFF_FF5B,
    IsoTagBusy = 0xFFFF_FF5C,
    IsoTagMeasureNotSupport = 0xFFFF_FF5D,
}

/// Numeric band of an [`ErrorCode`]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorBand {
    Success,
    Reader,
    GbTag,
    IsoTag,
}

/// How a failure should be handled
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Link is unusable for the current transaction
    Transport,
    /// Bytes arrived but did not form a valid frame; the channel may be out of sync
    Framing,
    /// Device rejected or failed the command
    Command,
    /// Outcome of a single tag; the channel itself is fine
    TagProtocol,
}

impl ErrorCode {
    /// Every defined code, in numeric order
    pub const ALL: [ErrorCode; 49] = [
        Self::Ok,
        Self::PortHandleErr,
        Self::PortOpenFailed,
        Self::DllInnerFailed,
        Self::CmdParamErr,
        Self::CmdSerialNumExist,
        Self::CmdInnerErr,
        Self::CmdInventoryStop,
        Self::CmdTagNoResp,
        Self::CmdDecodeTagDataFail,
        Self::CmdCodeOverflow,
        Self::CmdAuthFail,
        Self::CmdPwdErr,
        Self::CmdSamNoResp,
        Self::CmdSamCmdFail,
        Self::CmdRespFormatErr,
        Self::CmdHasMoreData,
        Self::CmdBufOverflow,
        Self::CmdCommTimeout,
        Self::CmdCommWriteFailed,
        Self::CmdCommReadFailed,
        Self::CmdNoMoreData,
        Self::DllUnconnect,
        Self::DllDisconnect,
        Self::CmdRespCrcErr,
        Self::CmdIapCrcErr,
        Self::CmdDownloadErr,
        Self::CmdDownloadNoneErr,
        Self::GbTagLowPower,
        Self::GbTagOprLimit,
        Self::GbTagMemOvf,
        Self::GbTagMemLck,
        Self::GbTagPwdErr,
        Self::GbTagAuthFail,
        Self::GbTagUnknownErr,
        Self::IsoTagOtherErr,
        Self::IsoTagNotSupport,
        Self::IsoTagOprLimit,
        Self::IsoTagMemOvf,
        Self::IsoTagMemLck,
        Self::IsoTagCryptoErr,
        Self::IsoTagNotEncap,
        Self::IsoTagRespOvf,
        Self::IsoTagSecTimeout,
        Self::IsoTagLowPower,
        Self::IsoTagUnknownErr,
        Self::IsoTagSensorCfg,
        Self::IsoTagBusy,
        Self::IsoTagMeasureNotSupport,
    ];

    /// Raw 32-bit value
    pub fn value(self) -> u32 {
        self as u32
    }

    pub fn is_success(self) -> bool {
        self == Self::Ok
    }

    /// Band the numeric value falls into
    pub fn band(self) -> ErrorBand {
        match self.value() {
            0 => ErrorBand::Success,
            0xFFFF_FF01..=0xFFFF_FF23 => ErrorBand::Reader,
            0xFFFF_FF40..=0xFFFF_FF46 => ErrorBand::GbTag,
            _ => ErrorBand::IsoTag,
        }
    }

    /// Handling class; `None` for [`ErrorCode::Ok`]
    pub fn kind(self) -> Option<ErrorKind> {
        let kind = match self {
            Self::Ok => return None,

            Self::PortHandleErr
            | Self::PortOpenFailed
            | Self::CmdCommTimeout
            | Self::CmdCommWriteFailed
            | Self::CmdCommReadFailed
            | Self::DllUnconnect
            | Self::DllDisconnect => ErrorKind::Transport,

            Self::CmdRespFormatErr | Self::CmdRespCrcErr => ErrorKind::Framing,

            Self::CmdTagNoResp
            | Self::CmdDecodeTagDataFail
            | Self::CmdAuthFail
            | Self::CmdPwdErr => ErrorKind::TagProtocol,

            Self::DllInnerFailed
            | Self::CmdParamErr
            | Self::CmdSerialNumExist
            | Self::CmdInnerErr
            | Self::CmdInventoryStop
            | Self::CmdCodeOverflow
            | Self::CmdSamNoResp
            | Self::CmdSamCmdFail
            | Self::CmdHasMoreData
            | Self::CmdBufOverflow
            | Self::CmdNoMoreData
            | Self::CmdIapCrcErr
            | Self::CmdDownloadErr
            | Self::CmdDownloadNoneErr => ErrorKind::Command,

            _ => ErrorKind::TagProtocol,
        };
        Some(kind)
    }

    /// "Nothing to report right now" outcomes of an inventory poll
    pub fn is_no_tag(self) -> bool {
        matches!(self, Self::CmdInventoryStop | Self::CmdNoMoreData)
    }

    /// Short description
    pub fn description(self) -> &'static str {
        match self {
            Self::Ok => "success",
            Self::PortHandleErr => "invalid handle or port parameter",
            Self::PortOpenFailed => "failed to open port",
            Self::DllInnerFailed => "internal library error",
            Self::CmdParamErr => "parameter out of range or unsupported",
            Self::CmdSerialNumExist => "serial number already exists",
            Self::CmdInnerErr => "device internal error",
            Self::CmdInventoryStop => "no tag inventoried or inventory ended",
            Self::CmdTagNoResp => "tag response timeout",
            Self::CmdDecodeTagDataFail => "failed to demodulate tag data",
            Self::CmdCodeOverflow => "tag data exceeds maximum transfer length",
            Self::CmdAuthFail => "authentication failed",
            Self::CmdPwdErr => "password error",
            Self::CmdSamNoResp => "SAM card not responding",
            Self::CmdSamCmdFail => "PSAM card command failed",
            Self::CmdRespFormatErr => "reader response format error",
            Self::CmdHasMoreData => "more data pending",
            Self::CmdBufOverflow => "buffer too small",
            Self::CmdCommTimeout => "timed out waiting for reader response",
            Self::CmdCommWriteFailed => "failed to write to port",
            Self::CmdCommReadFailed => "failed to read from port",
            Self::CmdNoMoreData => "no more data",
            Self::DllUnconnect => "connection not established",
            Self::DllDisconnect => "connection lost",
            Self::CmdRespCrcErr => "reader response CRC error",
            Self::CmdIapCrcErr => "firmware image CRC error",
            Self::CmdDownloadErr => "firmware download error",
            Self::CmdDownloadNoneErr => "user area download incomplete",
            Self::GbTagLowPower => "GB tag: insufficient power",
            Self::GbTagOprLimit => "GB tag: operation not permitted",
            Self::GbTagMemOvf => "GB tag: memory overflow or bank missing",
            Self::GbTagMemLck => "GB tag: memory locked",
            Self::GbTagPwdErr => "GB tag: access password error",
            Self::GbTagAuthFail => "GB tag: authentication failed",
            Self::GbTagUnknownErr => "GB tag: unknown error",
            Self::IsoTagOtherErr => "ISO tag: other error",
            Self::IsoTagNotSupport => "ISO tag: parameter not supported",
            Self::IsoTagOprLimit => "ISO tag: insufficient privileges",
            Self::IsoTagMemOvf => "ISO tag: memory overrun",
            Self::IsoTagMemLck => "ISO tag: memory locked",
            Self::IsoTagCryptoErr => "ISO tag: crypto suite error",
            Self::IsoTagNotEncap => "ISO tag: command not encapsulated",
            Self::IsoTagRespOvf => "ISO tag: response buffer overflow",
            Self::IsoTagSecTimeout => "ISO tag: security timeout",
            Self::IsoTagLowPower => "ISO tag: insufficient power",
            Self::IsoTagUnknownErr => "ISO tag: unknown error",
            Self::IsoTagSensorCfg => "ISO tag: sensor schedule limit exceeded",
            Self::IsoTagBusy => "ISO tag: busy",
            Self::IsoTagMeasureNotSupport => "ISO tag: measurement type not supported",
        }
    }
}

impl From<ErrorCode> for u32 {
    fn from(code: ErrorCode) -> u32 {
        code as u32
    }
}

impl TryFrom<u32> for ErrorCode {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|code| code.value() == value)
            .ok_or(Error::UnknownErrorCode(value))
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X} ({})", self.value(), self.description())
    }
}

/// Tag air-interface family whose status vocabulary applies
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TagFamily {
    Gb,
    Iso,
}

/// Vocabulary a status byte must be read with
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StatusContext {
    /// Generic reader status byte of any response frame
    Reader,
    /// Tag status carried inside a tag-data response
    Tag(TagFamily),
}

/// Map a raw status byte into the host-facing code space
///
/// Returns `None` when the status denotes success. Unknown reader statuses
/// become [`ErrorCode::CmdRespFormatErr`]; unknown tag statuses become the
/// family's "unknown" code, so the result never leaves the context's band.
pub fn classify(status: u8, context: StatusContext) -> Option<ErrorCode> {
    match context {
        StatusContext::Reader => classify_reader(status),
        StatusContext::Tag(TagFamily::Gb) => Some(classify_gb(status)),
        StatusContext::Tag(TagFamily::Iso) => Some(classify_iso(status)),
    }
}

fn classify_reader(status: u8) -> Option<ErrorCode> {
    use reader_status::*;

    let code = match status {
        OK => return None,
        PARAM_ERR => ErrorCode::CmdParamErr,
        OPR_ERR => ErrorCode::CmdInnerErr,
        SERIAL_NUM_ERR => ErrorCode::CmdSerialNumExist,
        INVENT_END => ErrorCode::CmdInventoryStop,
        TAG_NO_RESP => ErrorCode::CmdTagNoResp,
        TAG_CRC_ERR => ErrorCode::CmdDecodeTagDataFail,
        AUTH_FAILED => ErrorCode::CmdAuthFail,
        TAG_PWD_ERR => ErrorCode::CmdPwdErr,
        SAM_NO_RESP => ErrorCode::CmdSamNoResp,
        SAM_OPRT_ERR => ErrorCode::CmdSamCmdFail,
        NOMORE_DATA => ErrorCode::CmdNoMoreData,
        _ => ErrorCode::CmdRespFormatErr,
    };
    Some(code)
}

fn classify_gb(status: u8) -> ErrorCode {
    use gb_status::*;

    match status {
        LOW_POWER => ErrorCode::GbTagLowPower,
        OPR_LIMIT => ErrorCode::GbTagOprLimit,
        MEM_OVF => ErrorCode::GbTagMemOvf,
        MEM_LCK => ErrorCode::GbTagMemLck,
        PWD_ERR => ErrorCode::GbTagPwdErr,
        AUTH_FAIL => ErrorCode::GbTagAuthFail,
        UNKNW_ERR => ErrorCode::GbTagUnknownErr,
        _ => ErrorCode::GbTagUnknownErr,
    }
}

fn classify_iso(status: u8) -> ErrorCode {
    use iso_status::*;

    match status {
        OTHER_ERR => ErrorCode::IsoTagOtherErr,
        NOT_SUPPORT => ErrorCode::IsoTagNotSupport,
        OPR_LIMIT => ErrorCode::IsoTagOprLimit,
        MEM_OVF => ErrorCode::IsoTagMemOvf,
        MEM_LCK => ErrorCode::IsoTagMemLck,
        CRYPTO_ERR => ErrorCode::IsoTagCryptoErr,
        NOT_ENCAP => ErrorCode::IsoTagNotEncap,
        RESP_OVF => ErrorCode::IsoTagRespOvf,
        SEC_TIMEOUT => ErrorCode::IsoTagSecTimeout,
        LOW_POWER => ErrorCode::IsoTagLowPower,
        SENSOR_CFG => ErrorCode::IsoTagSensorCfg,
        TAG_BUSY => ErrorCode::IsoTagBusy,
        MEASU_NOT_SUPPORT => ErrorCode::IsoTagMeasureNotSupport,
        UNKNW_ERR => ErrorCode::IsoTagUnknownErr,
        _ => ErrorCode::IsoTagUnknownErr,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_reader_success() {
        assert_eq!(classify(0x00, StatusContext::Reader), None);
    }

    #[test]
    fn test_reader_vocabulary() {
        let expected = [
            (0x01, ErrorCode::CmdParamErr),
            (0x02, ErrorCode::CmdInnerErr),
            (0x03, ErrorCode::CmdSerialNumExist),
            (0x12, ErrorCode::CmdInventoryStop),
            (0x14, ErrorCode::CmdTagNoResp),
            (0x15, ErrorCode::CmdDecodeTagDataFail),
            (0x16, ErrorCode::CmdAuthFail),
            (0x17, ErrorCode::CmdPwdErr),
            (0x21, ErrorCode::CmdSamNoResp),
            (0x22, ErrorCode::CmdSamCmdFail),
            (0xFF, ErrorCode::CmdNoMoreData),
        ];

        for (status, code) in expected {
            assert_eq!(classify(status, StatusContext::Reader), Some(code));
        }
    }

    #[test]
    fn test_inventory_end_distinct_from_no_more_data() {
        let ended = classify(0x12, StatusContext::Reader).unwrap();
        let drained = classify(0xFF, StatusContext::Reader).unwrap();

        assert_ne!(ended, drained);
        assert!(ended.is_no_tag());
        assert!(drained.is_no_tag());
    }

    #[test]
    fn test_unknown_reader_status_is_format_error() {
        assert_eq!(
            classify(0x42, StatusContext::Reader),
            Some(ErrorCode::CmdRespFormatErr)
        );
    }

    #[test]
    fn test_shared_unknown_status_resolved_by_family() {
        // 0x88 means "unknown error" in both tag vocabularies
        assert_eq!(
            classify(0x88, StatusContext::Tag(TagFamily::Gb)),
            Some(ErrorCode::GbTagUnknownErr)
        );
        assert_eq!(
            classify(0x88, StatusContext::Tag(TagFamily::Iso)),
            Some(ErrorCode::IsoTagUnknownErr)
        );
    }

    #[test]
    fn test_overlapping_tag_statuses() {
        assert_eq!(classify(0x83, StatusContext::Tag(TagFamily::Gb)), Some(ErrorCode::GbTagLowPower));
        assert_eq!(
            classify(0x83, StatusContext::Tag(TagFamily::Iso)),
            Some(ErrorCode::IsoTagMeasureNotSupport)
        );
        assert_eq!(classify(0x00, StatusContext::Tag(TagFamily::Iso)), Some(ErrorCode::IsoTagOtherErr));
        assert_eq!(classify(0x0B, StatusContext::Tag(TagFamily::Iso)), Some(ErrorCode::IsoTagLowPower));
    }

    #[test]
    fn test_bands_never_alias() {
        for status in 0..=u8::MAX {
            if let Some(code) = classify(status, StatusContext::Reader) {
                assert_eq!(code.band(), ErrorBand::Reader, "reader status 0x{status:02X}");
            }

            let gb = classify(status, StatusContext::Tag(TagFamily::Gb)).unwrap();
            assert_eq!(gb.band(), ErrorBand::GbTag, "gb status 0x{status:02X}");
            assert_eq!(gb.kind(), Some(ErrorKind::TagProtocol));

            let iso = classify(status, StatusContext::Tag(TagFamily::Iso)).unwrap();
            assert_eq!(iso.band(), ErrorBand::IsoTag, "iso status 0x{status:02X}");
            assert_eq!(iso.kind(), Some(ErrorKind::TagProtocol));
        }
    }

    #[test]
    fn test_reader_mapping_is_injective() {
        let mut seen = std::collections::HashMap::new();
        for status in 0..=u8::MAX {
            if let Some(code) = classify(status, StatusContext::Reader) {
                if code == ErrorCode::CmdRespFormatErr {
                    continue;
                }
                if let Some(previous) = seen.insert(code, status) {
                    panic!("0x{previous:02X} and 0x{status:02X} both map to {code}");
                }
            }
        }
        assert_eq!(seen.len(), 11);
    }

    #[test]
    fn test_code_conversion() {
        for code in ErrorCode::ALL {
            assert_eq!(ErrorCode::try_from(code.value()).unwrap(), code);
        }
        assert!(ErrorCode::try_from(0xFFFF_FF30).is_err());
        assert_eq!(u32::from(ErrorCode::CmdCommTimeout), 0xFFFF_FF12);
    }

    #[test]
    fn test_codes_sorted_and_unique() {
        for pair in ErrorCode::ALL.windows(2) {
            assert!(pair[0].value() < pair[1].value());
        }
    }

    #[test]
    fn test_kinds() {
        assert_eq!(ErrorCode::Ok.kind(), None);
        assert_eq!(ErrorCode::CmdCommTimeout.kind(), Some(ErrorKind::Transport));
        assert_eq!(ErrorCode::CmdRespCrcErr.kind(), Some(ErrorKind::Framing));
        assert_eq!(ErrorCode::CmdParamErr.kind(), Some(ErrorKind::Command));
        assert_eq!(ErrorCode::CmdTagNoResp.kind(), Some(ErrorKind::TagProtocol));
        assert_eq!(ErrorCode::IsoTagBusy.kind(), Some(ErrorKind::TagProtocol));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            ErrorCode::CmdCommTimeout.to_string(),
            "0xFFFFFF12 (timed out waiting for reader response)"
        );
    }
}
