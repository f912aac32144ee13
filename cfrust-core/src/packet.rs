//! Reader protocol frame structure and encoding/decoding

use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;

use crate::{
    crc,
    error::{Error, FrameError, Result},
};

/// Direction of a frame; only responses carry a status byte
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FrameKind {
    /// Host to reader
    Command,
    /// Reader to host
    Response,
}

impl FrameKind {
    fn status_size(self) -> usize {
        match self {
            Self::Command => 0,
            Self::Response => 1,
        }
    }
}

/// Reader protocol frame
///
/// # Frame Structure
///
/// ```text
/// ┌──────┬──────┬──────────┬──────────┬──────────┬───────────┬──────────┐
/// │ Head │ Addr │  Length  │  Opcode  │  Status  │  Payload  │   CRC    │
/// │ 0xCF │  1   │ 2 (BE)   │  2 (BE)  │ 1 (resp) │  N bytes  │  2 (LE)  │
/// └──────┴──────┴──────────┴──────────┴──────────┴───────────┴──────────┘
/// ```
///
/// `Length` counts opcode, status and payload. The CRC covers everything
/// from `Addr` through the end of the payload.
///
/// # Examples
///
/// ```
/// use cfrust_core::packet::{FrameKind, Packet};
///
/// let packet = Packet::command(0xFF, 0x0051, Vec::new());
/// let encoded = packet.encode().unwrap();
/// assert_eq!(&encoded[..], &[0xCF, 0xFF, 0x00, 0x02, 0x00, 0x51, 0x66, 0x33]);
///
/// let decoded = Packet::decode(&encoded, FrameKind::Command).unwrap();
/// assert_eq!(decoded, packet);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Packet {
    /// Device address (0xFF addresses any reader)
    pub address: u8,

    /// Operation selector, meaning depends on the active protocol family
    pub opcode: u16,

    /// Status byte, present on responses only
    pub status: Option<u8>,

    /// Command-specific data
    pub payload: Bytes,
}

impl Packet {
    /// Frame head sentinel
    pub const HEAD: u8 = 0xCF;

    /// Head, address and length field
    pub const PREFIX_SIZE: usize = 4;

    /// Opcode field size
    pub const OPCODE_SIZE: usize = 2;

    /// Trailing CRC size
    pub const CRC_SIZE: usize = 2;

    /// Largest payload any field declares (whitelist transfers)
    pub const MAX_PAYLOAD_SIZE: usize = 4096;

    /// Create a command frame
    pub fn command(address: u8, opcode: u16, payload: impl Into<Bytes>) -> Self {
        Self {
            address,
            opcode,
            status: None,
            payload: payload.into(),
        }
    }

    /// Create a response frame
    pub fn response(address: u8, opcode: u16, status: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            address,
            opcode,
            status: Some(status),
            payload: payload.into(),
        }
    }

    pub fn kind(&self) -> FrameKind {
        if self.status.is_some() {
            FrameKind::Response
        } else {
            FrameKind::Command
        }
    }

    /// Value of the length field
    pub fn declared_len(&self) -> usize {
        Self::OPCODE_SIZE + self.kind().status_size() + self.payload.len()
    }

    /// Total size on the wire
    pub fn size(&self) -> usize {
        Self::PREFIX_SIZE + self.declared_len() + Self::CRC_SIZE
    }

    /// Check if this is a success response
    pub fn is_success(&self) -> bool {
        self.status == Some(0x00)
    }

    /// Encode frame to bytes
    ///
    /// # Errors
    ///
    /// [`Error::InvalidPayload`] if the payload exceeds
    /// [`Packet::MAX_PAYLOAD_SIZE`].
    pub fn encode(&self) -> Result<BytesMut> {
        if self.payload.len() > Self::MAX_PAYLOAD_SIZE {
            return Err(Error::InvalidPayload {
                size: self.payload.len(),
                max: Self::MAX_PAYLOAD_SIZE,
            });
        }

        let mut buf = BytesMut::with_capacity(self.size());

        buf.put_u8(Self::HEAD);
        buf.put_u8(self.address);
        buf.put_u16(self.declared_len() as u16);
        buf.put_u16(self.opcode);
        if let Some(status) = self.status {
            buf.put_u8(status);
        }
        buf.put_slice(&self.payload);

        let crc = crc::crc16(&buf[1..]);
        buf.put_u16_le(crc);

        Ok(buf)
    }

    /// Total frame length announced by a (possibly partial) buffer
    ///
    /// Returns `Ok(None)` until the length field has arrived.
    pub fn peek_frame_len(buf: &[u8], kind: FrameKind) -> std::result::Result<Option<usize>, FrameError> {
        let Some(&head) = buf.first() else {
            return Ok(None);
        };
        if head != Self::HEAD {
            return Err(FrameError::BadHeader(head));
        }
        if buf.len() < Self::PREFIX_SIZE {
            return Ok(None);
        }

        let declared = u16::from_be_bytes([buf[2], buf[3]]) as usize;
        let min = Self::OPCODE_SIZE + kind.status_size();
        if declared < min || declared > min + Self::MAX_PAYLOAD_SIZE {
            return Err(FrameError::LengthMismatch {
                declared,
                actual: buf.len().saturating_sub(Self::PREFIX_SIZE + Self::CRC_SIZE),
            });
        }

        Ok(Some(Self::PREFIX_SIZE + declared + Self::CRC_SIZE))
    }

    /// Decode exactly one frame
    ///
    /// # Errors
    ///
    /// - [`FrameError::Incomplete`] if the buffer ends early (keep reading)
    /// - [`FrameError::BadHeader`] if the head byte is wrong
    /// - [`FrameError::LengthMismatch`] if the length field is impossible or
    ///   the buffer holds more than one frame's worth of bytes
    /// - [`FrameError::CrcMismatch`] if verification fails
    pub fn decode(buf: &[u8], kind: FrameKind) -> std::result::Result<Self, FrameError> {
        let total = match Self::peek_frame_len(buf, kind)? {
            Some(total) => total,
            None => {
                return Err(FrameError::Incomplete {
                    needed: Self::PREFIX_SIZE - buf.len(),
                });
            }
        };

        if buf.len() < total {
            return Err(FrameError::Incomplete {
                needed: total - buf.len(),
            });
        }
        if buf.len() > total {
            return Err(FrameError::LengthMismatch {
                declared: total - Self::PREFIX_SIZE - Self::CRC_SIZE,
                actual: buf.len() - Self::PREFIX_SIZE - Self::CRC_SIZE,
            });
        }

        let body_end = total - Self::CRC_SIZE;
        let received = u16::from_le_bytes([buf[body_end], buf[body_end + 1]]);
        let expected = crc::crc16(&buf[1..body_end]);
        if expected != received {
            return Err(FrameError::CrcMismatch { expected, received });
        }

        let address = buf[1];
        let opcode = u16::from_be_bytes([buf[4], buf[5]]);
        let mut offset = Self::PREFIX_SIZE + Self::OPCODE_SIZE;
        let status = match kind {
            FrameKind::Command => None,
            FrameKind::Response => {
                offset += 1;
                Some(buf[offset - 1])
            }
        };

        Ok(Self {
            address,
            opcode,
            status,
            payload: Bytes::copy_from_slice(&buf[offset..body_end]),
        })
    }
}

impl fmt::Debug for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Packet")
            .field("address", &format!("0x{:02X}", self.address))
            .field("opcode", &format!("0x{:04X}", self.opcode))
            .field("status", &self.status.map(|s| format!("0x{:02X}", s)))
            .field("payload", &hex::encode_upper(&self.payload))
            .finish()
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(
                f,
                "Response[0x{:04X}](addr=0x{:02X}, status=0x{:02X}, len={})",
                self.opcode,
                self.address,
                status,
                self.payload.len()
            ),
            None => write!(
                f,
                "Command[0x{:04X}](addr=0x{:02X}, len={})",
                self.opcode,
                self.address,
                self.payload.len()
            ),
        }
    }
}
