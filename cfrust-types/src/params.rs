//! Reader configuration parameters
//!
//! Every struct validates against the width and range of its wire fields
//! before anything is sent.

use std::fmt;

use bitflags::bitflags;
use byteorder::{BigEndian, ByteOrder};
use bytes::{BufMut, Bytes, BytesMut};

use cfrust_core::constants::{relay, TYPE_GET, TYPE_SET};
use cfrust_core::ProtocolFamily;

use crate::error::{ensure_len, Error, Result};

/// Transmit power in dBm
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RfPower(u8);

impl RfPower {
    pub const MAX: u8 = 33;

    pub fn new(dbm: u8) -> Result<Self> {
        if dbm > Self::MAX {
            return Err(Error::out_of_range("RF power", dbm, 0, i64::from(Self::MAX)));
        }
        Ok(Self(dbm))
    }

    pub fn dbm(self) -> u8 {
        self.0
    }

    /// `POWER | RESERVED`
    pub fn encode(self) -> Bytes {
        Bytes::from(vec![self.0, 0x00])
    }

    pub fn decode(payload: &[u8]) -> Result<Self> {
        ensure_len("RF power", payload, 1)?;
        Self::new(payload[0]).map_err(|_| Error::Parse(format!("reader reported RF power {}", payload[0])))
    }
}

impl fmt::Display for RfPower {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} dBm", self.0)
    }
}

/// Regulatory frequency region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Region {
    Fcc = 0x01,
    Etsi = 0x02,
    Chn = 0x03,
    Korea = 0x04,
    Japan = 0x05,
    Open = 0x06,
}

impl TryFrom<u8> for Region {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0x01 => Ok(Self::Fcc),
            0x02 => Ok(Self::Etsi),
            0x03 => Ok(Self::Chn),
            0x04 => Ok(Self::Korea),
            0x05 => Ok(Self::Japan),
            0x06 => Ok(Self::Open),
            _ => Err(Error::Parse(format!("invalid region: 0x{:02X}", value))),
        }
    }
}

/// Hopping plan
///
/// Frequencies are in the reader's own units and are passed through
/// unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrequencyPlan {
    pub region: Region,
    pub start: u16,
    pub stop: u16,
    pub step: u16,
    pub channels: u8,
}

impl FrequencyPlan {
    pub const SIZE: usize = 8;

    pub fn validate(&self) -> Result<()> {
        if self.start > self.stop {
            return Err(Error::Validation(format!(
                "start frequency {} above stop frequency {}",
                self.start, self.stop
            )));
        }
        if self.channels == 0 {
            return Err(Error::out_of_range("channel count", 0u8, 1, 255));
        }
        Ok(())
    }

    /// `REGION | START(2) | STOP(2) | STEP(2) | CHANNELS`
    pub fn encode(&self) -> Result<Bytes> {
        self.validate()?;

        let mut buf = BytesMut::with_capacity(Self::SIZE);
        buf.put_u8(self.region as u8);
        buf.put_u16(self.start);
        buf.put_u16(self.stop);
        buf.put_u16(self.step);
        buf.put_u8(self.channels);
        Ok(buf.freeze())
    }

    pub fn decode(payload: &[u8]) -> Result<Self> {
        ensure_len("frequency plan", payload, Self::SIZE)?;

        Ok(Self {
            region: Region::try_from(payload[0])?,
            start: BigEndian::read_u16(&payload[1..3]),
            stop: BigEndian::read_u16(&payload[3..5]),
            step: BigEndian::read_u16(&payload[5..7]),
            channels: payload[7],
        })
    }
}

bitflags! {
    /// Enabled antenna ports
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AntennaMask: u8 {
        const ANT1 = 1 << 0;
        const ANT2 = 1 << 1;
        const ANT3 = 1 << 2;
        const ANT4 = 1 << 3;
        const ANT5 = 1 << 4;
        const ANT6 = 1 << 5;
        const ANT7 = 1 << 6;
        const ANT8 = 1 << 7;
    }
}

impl AntennaMask {
    pub fn encode(self) -> Result<Bytes> {
        if self.is_empty() {
            return Err(Error::Validation("at least one antenna must be enabled".into()));
        }
        Ok(Bytes::from(vec![self.bits()]))
    }

    pub fn decode(payload: &[u8]) -> Result<Self> {
        ensure_len("antenna mask", payload, 1)?;
        Ok(Self::from_bits_retain(payload[0]))
    }
}

/// Current temperature and shutdown threshold, in degrees Celsius
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Temperature {
    pub current: u8,
    pub limit: u8,
}

impl Temperature {
    pub fn decode(payload: &[u8]) -> Result<Self> {
        ensure_len("temperature", payload, 2)?;
        Ok(Self {
            current: payload[0],
            limit: payload[1],
        })
    }

    /// `LIMIT | RESERVED`
    pub fn encode_limit(limit: u8) -> Bytes {
        Bytes::from(vec![limit, 0x00])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayAction {
    Release,
    Close,
}

/// Drive the relay for a while
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayCommand {
    pub action: RelayAction,
    /// Hold time in units of 100 ms
    pub hold: u8,
}

impl RelayCommand {
    /// `ACTION | HOLD`
    pub fn encode(self) -> Bytes {
        let action = match self.action {
            RelayAction::Release => relay::RELEASE,
            RelayAction::Close => relay::CLOSE,
        };
        Bytes::from(vec![action, self.hold])
    }
}

/// Direction of a whitelist transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WhitelistOption {
    /// Read the stored list from the reader
    Fetch = 0x00,
    /// Replace the stored list
    Update = 0x01,
}

/// Opens a whitelist transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WhitelistBegin {
    pub option: WhitelistOption,
    /// Number of entries to transfer
    pub entries: u16,
}

impl WhitelistBegin {
    /// `OPTION | ENTRIES(2)`
    pub fn encode(self) -> Bytes {
        let mut buf = BytesMut::with_capacity(3);
        buf.put_u8(self.option as u8);
        buf.put_u16(self.entries);
        buf.freeze()
    }
}

/// Entry count confirmed by the reader at the end of a transfer
pub fn decode_whitelist_count(payload: &[u8]) -> Result<u16> {
    ensure_len("whitelist count", payload, 2)?;
    Ok(BigEndian::read_u16(payload))
}

/// Protocol-type query or update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RfidType {
    Query,
    Set(ProtocolFamily),
}

impl RfidType {
    pub fn encode(self) -> Bytes {
        match self {
            Self::Query => Bytes::from(vec![TYPE_GET]),
            Self::Set(family) => Bytes::from(vec![TYPE_SET, family.to_wire()]),
        }
    }

    /// Family reported by a query
    pub fn decode(payload: &[u8]) -> Result<ProtocolFamily> {
        ensure_len("RFID type", payload, 1)?;
        ProtocolFamily::from_wire(payload[0])
            .ok_or_else(|| Error::Parse(format!("unknown RFID type: 0x{:02X}", payload[0])))
    }
}
