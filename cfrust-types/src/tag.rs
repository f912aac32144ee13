//! Tag reports, tag operation responses and tag operation requests

use std::fmt;

use byteorder::{BigEndian, ByteOrder};
use bytes::{BufMut, Bytes, BytesMut};
use chrono::{DateTime, Utc};

use crate::error::{ensure_len, Error, Result};

/// Largest tag code the reader transfers
pub const MAX_CODE_LEN: usize = 255;

/// Largest number of words in one read or write
pub const MAX_WORD_COUNT: u8 = 120;

/// One inventoried tag
///
/// Wire payload: `RSSI(2) | ANT | CH | CRC(2) | PC(2) | LEN | CODE(LEN)`.
/// The sequence number and timestamp are assigned on the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagReport {
    pub sequence: u16,
    /// Signal strength in 0.1 dBm
    pub rssi: i16,
    pub antenna: u8,
    pub channel: u8,
    pub crc: [u8; 2],
    pub pc: [u8; 2],
    pub code: Bytes,
    pub seen_at: DateTime<Utc>,
}

impl TagReport {
    pub const HEADER_SIZE: usize = 9;

    pub fn decode(payload: &[u8], sequence: u16, seen_at: DateTime<Utc>) -> Result<Self> {
        ensure_len("tag report", payload, Self::HEADER_SIZE)?;

        let code_len = payload[8] as usize;
        if code_len == 0 {
            return Err(Error::Parse("tag report carries an empty code".into()));
        }
        if payload.len() != Self::HEADER_SIZE + code_len {
            return Err(Error::Parse(format!(
                "tag report declares {} code bytes but carries {}",
                code_len,
                payload.len() - Self::HEADER_SIZE
            )));
        }

        Ok(Self {
            sequence,
            rssi: BigEndian::read_i16(&payload[0..2]),
            antenna: payload[2],
            channel: payload[3],
            crc: [payload[4], payload[5]],
            pc: [payload[6], payload[7]],
            code: Bytes::copy_from_slice(&payload[Self::HEADER_SIZE..]),
            seen_at,
        })
    }

    /// Wire payload of this report, as the reader streams it
    pub fn encode(&self) -> Result<Bytes> {
        if self.code.is_empty() || self.code.len() > MAX_CODE_LEN {
            return Err(Error::out_of_range("code length", self.code.len() as i64, 1, MAX_CODE_LEN as i64));
        }

        let mut buf = BytesMut::with_capacity(Self::HEADER_SIZE + self.code.len());
        buf.put_i16(self.rssi);
        buf.put_u8(self.antenna);
        buf.put_u8(self.channel);
        buf.put_slice(&self.crc);
        buf.put_slice(&self.pc);
        buf.put_u8(self.code.len() as u8);
        buf.put_slice(&self.code);
        Ok(buf.freeze())
    }

    /// Signal strength in dBm
    pub fn rssi_dbm(&self) -> f32 {
        f32::from(self.rssi) / 10.0
    }

    /// Tag code as upper-case hex
    pub fn epc_hex(&self) -> String {
        hex::encode_upper(&self.code)
    }
}

impl fmt::Display for TagReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} ant={} ch={} rssi={:.1}dBm",
            self.sequence,
            self.epc_hex(),
            self.antenna,
            self.channel,
            self.rssi_dbm()
        )
    }
}

/// Response to a tag access command (read, write, lock, kill, erase)
///
/// Wire payload: `STATUS | ANT | CRC(2) | PC(2) | LEN | CODE(LEN) | DATA...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagResponse {
    /// Tag status byte, in the active family's vocabulary
    pub tag_status: u8,
    pub antenna: u8,
    pub crc: [u8; 2],
    pub pc: [u8; 2],
    pub code: Bytes,
    /// Command-specific trailer
    pub data: Bytes,
}

impl TagResponse {
    pub const HEADER_SIZE: usize = 7;

    pub fn decode(payload: &[u8]) -> Result<Self> {
        ensure_len("tag response", payload, Self::HEADER_SIZE)?;

        let code_len = payload[6] as usize;
        ensure_len("tag response", payload, Self::HEADER_SIZE + code_len)?;
        let (code, data) = payload[Self::HEADER_SIZE..].split_at(code_len);

        Ok(Self {
            tag_status: payload[0],
            antenna: payload[1],
            crc: [payload[2], payload[3]],
            pc: [payload[4], payload[5]],
            code: Bytes::copy_from_slice(code),
            data: Bytes::copy_from_slice(data),
        })
    }

    /// Words returned by a read: `WORD_COUNT | WORDS(2 * WORD_COUNT)`
    pub fn words(&self) -> Result<Bytes> {
        ensure_len("read data", &self.data, 1)?;

        let byte_count = usize::from(self.data[0]) * 2;
        ensure_len("read data", &self.data, 1 + byte_count)?;
        Ok(self.data.slice(1..1 + byte_count))
    }

    pub fn epc_hex(&self) -> String {
        hex::encode_upper(&self.code)
    }
}

/// Tag memory bank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MemoryBank {
    Reserved = 0x00,
    Epc = 0x01,
    Tid = 0x02,
    User = 0x03,
}

impl TryFrom<u8> for MemoryBank {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0x00 => Ok(Self::Reserved),
            0x01 => Ok(Self::Epc),
            0x02 => Ok(Self::Tid),
            0x03 => Ok(Self::User),
            _ => Err(Error::Parse(format!("invalid memory bank: 0x{:02X}", value))),
        }
    }
}

impl From<MemoryBank> for u8 {
    fn from(bank: MemoryBank) -> u8 {
        bank as u8
    }
}

/// Lockable area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LockArea {
    KillPassword = 0x00,
    AccessPassword = 0x01,
    Epc = 0x02,
    Tid = 0x03,
    User = 0x04,
}

impl TryFrom<u8> for LockArea {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0x00 => Ok(Self::KillPassword),
            0x01 => Ok(Self::AccessPassword),
            0x02 => Ok(Self::Epc),
            0x03 => Ok(Self::Tid),
            0x04 => Ok(Self::User),
            _ => Err(Error::Parse(format!("invalid lock area: 0x{:02X}", value))),
        }
    }
}

impl From<LockArea> for u8 {
    fn from(area: LockArea) -> u8 {
        area as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LockAction {
    Unlock = 0x00,
    Lock = 0x01,
    PermanentUnlock = 0x02,
    PermanentLock = 0x03,
}

impl TryFrom<u8> for LockAction {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0x00 => Ok(Self::Unlock),
            0x01 => Ok(Self::Lock),
            0x02 => Ok(Self::PermanentUnlock),
            0x03 => Ok(Self::PermanentLock),
            _ => Err(Error::Parse(format!("invalid lock action: 0x{:02X}", value))),
        }
    }
}

impl From<LockAction> for u8 {
    fn from(action: LockAction) -> u8 {
        action as u8
    }
}

/// 32-bit access or kill password
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Password(pub [u8; 4]);

impl Password {
    pub fn is_zero(&self) -> bool {
        self.0 == [0; 4]
    }
}

impl From<u32> for Password {
    fn from(value: u32) -> Self {
        Self(value.to_be_bytes())
    }
}

/// Read words from a tag memory bank
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadTagRequest {
    /// Only access the tag matched by the select mask
    pub match_selected: bool,
    pub password: Password,
    pub bank: MemoryBank,
    pub word_ptr: u16,
    pub word_count: u8,
}

impl ReadTagRequest {
    pub fn new(bank: MemoryBank, word_ptr: u16, word_count: u8) -> Self {
        Self {
            match_selected: false,
            password: Password::default(),
            bank,
            word_ptr,
            word_count,
        }
    }

    pub fn with_password(mut self, password: impl Into<Password>) -> Self {
        self.password = password.into();
        self
    }

    pub fn matching_selected(mut self) -> Self {
        self.match_selected = true;
        self
    }

    /// `OPTION | PASSWORD(4) | BANK | PTR(2) | COUNT`
    pub fn encode(&self) -> Result<Bytes> {
        check_word_count(self.word_count)?;

        let mut buf = BytesMut::with_capacity(9);
        buf.put_u8(u8::from(self.match_selected));
        buf.put_slice(&self.password.0);
        buf.put_u8(self.bank.into());
        buf.put_u16(self.word_ptr);
        buf.put_u8(self.word_count);
        Ok(buf.freeze())
    }
}

/// Write words into a tag memory bank
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteTagRequest {
    pub match_selected: bool,
    pub password: Password,
    pub bank: MemoryBank,
    pub word_ptr: u16,
    /// Whole words; length must be even
    pub data: Bytes,
}

impl WriteTagRequest {
    pub fn new(bank: MemoryBank, word_ptr: u16, data: impl Into<Bytes>) -> Self {
        Self {
            match_selected: false,
            password: Password::default(),
            bank,
            word_ptr,
            data: data.into(),
        }
    }

    /// Replace the EPC; it starts after the stored CRC and PC words
    pub fn epc(epc: impl Into<Bytes>) -> Self {
        Self::new(MemoryBank::Epc, 2, epc)
    }

    pub fn with_password(mut self, password: impl Into<Password>) -> Self {
        self.password = password.into();
        self
    }

    pub fn matching_selected(mut self) -> Self {
        self.match_selected = true;
        self
    }

    /// `OPTION | PASSWORD(4) | BANK | PTR(2) | COUNT | DATA(2 * COUNT)`
    pub fn encode(&self) -> Result<Bytes> {
        if self.data.len() % 2 != 0 {
            return Err(Error::Validation(format!(
                "write data must be whole words, got {} bytes",
                self.data.len()
            )));
        }
        let words = self.data.len() / 2;
        if words == 0 || words > usize::from(MAX_WORD_COUNT) {
            return Err(Error::out_of_range("word count", words as i64, 1, i64::from(MAX_WORD_COUNT)));
        }

        let mut buf = BytesMut::with_capacity(9 + self.data.len());
        buf.put_u8(u8::from(self.match_selected));
        buf.put_slice(&self.password.0);
        buf.put_u8(self.bank.into());
        buf.put_u16(self.word_ptr);
        buf.put_u8(words as u8);
        buf.put_slice(&self.data);
        Ok(buf.freeze())
    }
}

/// Change the lock state of one area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockTagRequest {
    pub password: Password,
    pub area: LockArea,
    pub action: LockAction,
}

impl LockTagRequest {
    /// `PASSWORD(4) | AREA | ACTION`
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(6);
        buf.put_slice(&self.password.0);
        buf.put_u8(self.area.into());
        buf.put_u8(self.action.into());
        buf.freeze()
    }
}

/// Permanently disable a tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KillTagRequest {
    pub password: Password,
}

impl KillTagRequest {
    pub fn encode(&self) -> Result<Bytes> {
        // Tags refuse to be killed with a zero password
        if self.password.is_zero() {
            return Err(Error::Validation("kill password must not be zero".into()));
        }
        Ok(Bytes::copy_from_slice(&self.password.0))
    }
}

/// Restrict tag operations to tags whose EPC bank matches a mask
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectMask {
    /// Bit address in the EPC bank
    pub pointer: u16,
    pub bits: u8,
    pub mask: Bytes,
}

impl SelectMask {
    /// Bit address of the EPC, after the stored CRC and PC
    pub const EPC_POINTER: u16 = 32;

    pub fn new(pointer: u16, bits: u8, mask: impl Into<Bytes>) -> Result<Self> {
        let mask = mask.into();
        let expected = usize::from(bits).div_ceil(8);
        if mask.len() != expected {
            return Err(Error::Validation(format!(
                "{} mask bits need {} bytes, got {}",
                bits,
                expected,
                mask.len()
            )));
        }
        Ok(Self { pointer, bits, mask })
    }

    /// Match tags whose EPC starts with `prefix`
    pub fn epc_prefix(prefix: &[u8]) -> Result<Self> {
        if prefix.len() > MAX_CODE_LEN / 8 {
            return Err(Error::out_of_range("prefix length", prefix.len() as i64, 0, (MAX_CODE_LEN / 8) as i64));
        }
        Self::new(Self::EPC_POINTER, (prefix.len() * 8) as u8, Bytes::copy_from_slice(prefix))
    }

    /// Remove any mask
    pub fn clear() -> Self {
        Self {
            pointer: 0,
            bits: 0,
            mask: Bytes::new(),
        }
    }

    /// `PTR(2) | BITS | MASK(ceil(BITS / 8))`
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(3 + self.mask.len());
        buf.put_u16(self.pointer);
        buf.put_u8(self.bits);
        buf.put_slice(&self.mask);
        buf.freeze()
    }
}

/// Inventory start parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InventoryRequest {
    /// Rounds to run; 0 runs until stopped
    pub count: u8,
    /// Vendor inventory parameter word
    pub param: u32,
}

impl InventoryRequest {
    /// `COUNT | PARAM(4)`
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(5);
        buf.put_u8(self.count);
        buf.put_u32(self.param);
        buf.freeze()
    }
}

fn check_word_count(count: u8) -> Result<()> {
    if count == 0 || count > MAX_WORD_COUNT {
        return Err(Error::out_of_range("word count", count, 1, i64::from(MAX_WORD_COUNT)));
    }
    Ok(())
}
