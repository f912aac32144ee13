//! Request/response transactions over a transport
//!
//! A [`Link`] owns the byte stream to one reader and runs one transaction at
//! a time: write a command frame, then read until the matching response, a
//! framing error or the deadline. Every method takes `&mut self`, so two
//! transactions can never interleave on one handle. Wrap the owner in
//! `Arc<tokio::sync::Mutex<_>>` to share it between tasks.
//!
//! Frames that carry a different opcode are stale (typically inventory
//! reports that were already in flight) and are dropped without ending the
//! transaction. Nothing is retried.

use std::time::Duration;

use bytes::Bytes;
use tokio::time::Instant;
use tracing::{debug, trace, warn};

use cfrust_core::status::{self, StatusContext};
use cfrust_core::{CommandDescriptor, FrameBuffer, FrameKind, Packet, Scope};
use cfrust_transport::Transport;

use crate::error::{Error, Result};

/// Framed link to one reader
pub struct Link {
    transport: Box<dyn Transport>,
    address: u8,
    buffer: FrameBuffer,
}

impl Link {
    pub fn new(transport: Box<dyn Transport>, address: u8) -> Self {
        Self {
            transport,
            address,
            buffer: FrameBuffer::new(),
        }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    pub fn remote_addr(&self) -> String {
        self.transport.remote_addr()
    }

    /// Send a command and wait for its response payload
    ///
    /// # Errors
    ///
    /// - [`cfrust_core::Error::InvalidPayload`] if `payload` exceeds the
    ///   command's request limit; nothing is sent
    /// - [`cfrust_transport::Error::ReadTimeout`] if no byte arrived in time
    /// - [`Error::IncompleteResponse`] if only part of a frame arrived
    /// - [`Error::Device`] with the classified code on a non-success status
    /// - [`cfrust_core::Error::ResponseFormat`] if a successful payload does
    ///   not have the command's response shape
    pub async fn execute(
        &mut self,
        descriptor: &CommandDescriptor,
        payload: &[u8],
        timeout: Duration,
    ) -> Result<Bytes> {
        if !descriptor.is_executable() {
            return Err(cfrust_core::Error::NotExecutable(descriptor.opcode).into());
        }
        if payload.len() > descriptor.max_request {
            return Err(cfrust_core::Error::InvalidPayload {
                size: payload.len(),
                max: descriptor.max_request,
            }
            .into());
        }

        let frame = Packet::command(self.address, descriptor.opcode, Bytes::copy_from_slice(payload)).encode()?;

        if !self.buffer.is_empty() {
            debug!(stale = self.buffer.len(), "Dropping stale bytes before {}", descriptor);
            self.buffer.clear();
        }

        debug!(command = %descriptor, len = payload.len(), "Executing");
        trace!(frame = %hex::encode_upper(&frame), "Command frame");
        self.transport.send(&frame).await?;

        let response = self.read_response(descriptor, timeout, Partial::Discard).await?;
        check_response(descriptor, response)
    }

    /// Wait for an unsolicited frame of `descriptor`'s opcode
    ///
    /// Used for streamed inventory reports. Bytes after the returned frame
    /// stay buffered for the next call, and so does a report that is only
    /// partly received when `timeout` runs out: the call then reports
    /// [`cfrust_transport::Error::ReadTimeout`] and the next one completes it.
    pub async fn receive(&mut self, descriptor: &CommandDescriptor, timeout: Duration) -> Result<Bytes> {
        let response = self.read_response(descriptor, timeout, Partial::Keep).await?;
        check_response(descriptor, response)
    }

    /// Close the underlying transport
    pub async fn close(&mut self) -> Result<()> {
        self.buffer.clear();
        self.transport.disconnect().await?;
        Ok(())
    }

    async fn read_response(
        &mut self,
        descriptor: &CommandDescriptor,
        timeout: Duration,
        partial: Partial,
    ) -> Result<Packet> {
        let deadline = Instant::now() + timeout;

        loop {
            while let Some(packet) = self.buffer.next_frame(FrameKind::Response)? {
                if packet.opcode == descriptor.opcode {
                    trace!(response = %packet, "Matched response");
                    return Ok(packet);
                }
                warn!(
                    expected = %descriptor,
                    opcode = format_args!("0x{:04X}", packet.opcode),
                    "Discarding frame for another command"
                );
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(self.deadline_error(partial));
            }

            match self.transport.receive(remaining).await {
                Ok(bytes) => self.buffer.push(&bytes),
                Err(cfrust_transport::Error::ReadTimeout) => return Err(self.deadline_error(partial)),
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Nothing at all is a timeout; a partial reply to a command is a
    /// malformed response
    fn deadline_error(&mut self, partial: Partial) -> Error {
        if self.buffer.is_empty() || partial == Partial::Keep {
            if !self.buffer.is_empty() {
                trace!(buffered = self.buffer.len(), "Keeping partial frame for the next read");
            }
            return cfrust_transport::Error::ReadTimeout.into();
        }

        let buffered = self.buffer.len();
        warn!(buffered, "Deadline passed inside a frame, discarding partial bytes");
        self.buffer.clear();
        Error::IncompleteResponse { buffered }
    }
}

/// What to do with a partial frame when the deadline passes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Partial {
    /// Command reply: the transaction is over, drop it
    Discard,
    /// Streamed report: the rest may still arrive
    Keep,
}

/// Turn a matched response into its payload or a classified error
fn check_response(descriptor: &CommandDescriptor, packet: Packet) -> Result<Bytes> {
    let status = packet.status.unwrap_or(status::reader_status::OK);

    if let Some(code) = status::classify(status, StatusContext::Reader) {
        // Tag access failures put the tag's own status first in the payload
        let code = match (descriptor.scope, packet.payload.first()) {
            (Scope::Tag(family), Some(&tag_status)) if descriptor.carries_tag_data => {
                status::classify(tag_status, StatusContext::Tag(family.tag_family())).unwrap_or(code)
            }
            _ => code,
        };
        debug!(command = %descriptor, status = format_args!("0x{:02X}", status), %code, "Command failed");
        return Err(Error::Device(code));
    }

    if !descriptor.response.accepts(packet.payload.len()) {
        return Err(cfrust_core::Error::ResponseFormat {
            command: descriptor.name,
            len: packet.payload.len(),
        }
        .into());
    }

    Ok(packet.payload)
}
