//! Partial-frame accumulator
//!
//! Serial and socket reads return arbitrary chunks: half a frame, exactly one
//! frame, or several inventory reports back to back. `FrameBuffer` collects
//! those chunks and hands out complete frames one at a time.
//!
//! Bytes after a complete frame stay buffered, because the reader streams
//! inventory reports without being asked. A fatal framing error discards the
//! whole buffer since nothing in it can be trusted to start on a frame
//! boundary any more.

use bytes::BytesMut;
use tracing::{trace, warn};

use crate::error::FrameError;
use crate::packet::{FrameKind, Packet};

/// Buffer for accumulating incoming bytes and extracting complete frames
#[derive(Debug)]
pub struct FrameBuffer {
    buffer: BytesMut,
}

impl FrameBuffer {
    /// Default capacity: one maximum-size frame
    pub const DEFAULT_CAPACITY: usize =
        Packet::PREFIX_SIZE + Packet::OPCODE_SIZE + 1 + Packet::MAX_PAYLOAD_SIZE + Packet::CRC_SIZE;

    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(Self::DEFAULT_CAPACITY),
        }
    }

    /// Append freshly read bytes
    pub fn push(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
        trace!(pushed = data.len(), buffered = self.buffer.len(), "Buffered bytes");
    }

    /// Try to extract a single frame
    ///
    /// - `Ok(Some(packet))` if a complete frame was extracted
    /// - `Ok(None)` if more data is needed
    /// - `Err(...)` on a fatal framing error; the buffer is cleared
    pub fn next_frame(&mut self, kind: FrameKind) -> Result<Option<Packet>, FrameError> {
        let total = match Packet::peek_frame_len(&self.buffer, kind) {
            Ok(Some(total)) => total,
            Ok(None) => return Ok(None),
            Err(e) => {
                self.discard(&e);
                return Err(e);
            }
        };

        if self.buffer.len() < total {
            return Ok(None);
        }

        let frame = self.buffer.split_to(total);
        match Packet::decode(&frame, kind) {
            Ok(packet) => Ok(Some(packet)),
            Err(e) => {
                self.discard(&e);
                Err(e)
            }
        }
    }

    /// Drop everything buffered
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Number of buffered bytes
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    fn discard(&mut self, error: &FrameError) {
        warn!(
            error = %error,
            discarded = self.buffer.len(),
            "Discarding receive buffer after framing error"
        );
        self.buffer.clear();
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn response(opcode: u16, payload: &[u8]) -> Vec<u8> {
        Packet::response(0xFF, opcode, 0x00, payload.to_vec())
            .encode()
            .unwrap()
            .to_vec()
    }

    #[test]
    fn test_single_frame() {
        let mut buffer = FrameBuffer::new();
        buffer.push(&response(0x0051, &[1, 2, 3]));

        let packet = buffer.next_frame(FrameKind::Response).unwrap().unwrap();
        assert_eq!(packet.opcode, 0x0051);
        assert_eq!(packet.payload.as_ref(), &[1, 2, 3]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_fragmented_frame() {
        let bytes = response(0x0054, &[30, 0]);
        let mut buffer = FrameBuffer::new();

        for (i, byte) in bytes.iter().enumerate() {
            buffer.push(&[*byte]);
            let result = buffer.next_frame(FrameKind::Response).unwrap();
            if i + 1 < bytes.len() {
                assert!(result.is_none(), "frame completed early at byte {i}");
            } else {
                assert_eq!(result.unwrap().payload.as_ref(), &[30, 0]);
            }
        }
    }

    #[test]
    fn test_back_to_back_frames() {
        let mut bytes = response(0x0001, &[0xAA]);
        bytes.extend(response(0x0001, &[0xBB]));
        bytes.extend(&response(0x0001, &[0xCC])[..3]);

        let mut buffer = FrameBuffer::new();
        buffer.push(&bytes);

        let first = buffer.next_frame(FrameKind::Response).unwrap().unwrap();
        let second = buffer.next_frame(FrameKind::Response).unwrap().unwrap();
        assert_eq!(first.payload.as_ref(), &[0xAA]);
        assert_eq!(second.payload.as_ref(), &[0xBB]);

        assert!(buffer.next_frame(FrameKind::Response).unwrap().is_none());
        assert_eq!(buffer.len(), 3);
    }

    #[test]
    fn test_bad_header_clears_buffer() {
        let mut buffer = FrameBuffer::new();
        buffer.push(&[0x00, 0xCF, 0xFF]);

        assert_eq!(
            buffer.next_frame(FrameKind::Response),
            Err(FrameError::BadHeader(0x00))
        );
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_crc_error_clears_buffer() {
        let mut bytes = response(0x0051, &[1]);
        bytes[6] ^= 0x01;
        bytes.extend(response(0x0051, &[2]));

        let mut buffer = FrameBuffer::new();
        buffer.push(&bytes);

        assert!(matches!(
            buffer.next_frame(FrameKind::Response),
            Err(FrameError::CrcMismatch { .. })
        ));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_clear_drops_stale_partial() {
        let bytes = response(0x0051, &[1, 2, 3]);
        let mut buffer = FrameBuffer::new();
        buffer.push(&bytes[..5]);
        buffer.clear();

        buffer.push(&response(0x0054, &[7, 0]));
        let packet = buffer.next_frame(FrameKind::Response).unwrap().unwrap();
        assert_eq!(packet.opcode, 0x0054);
    }
}
