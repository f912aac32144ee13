//! Transport layer for CF-series readers
//!
//! Provides TCP and serial communication with readers, plus a scripted
//! mock for driving the protocol engine in tests.

pub mod error;
pub mod mock;
pub mod serial;
pub mod tcp;

pub use error::{Error, Result};
pub use mock::{MockHandle, MockTransport};
pub use serial::{SerialConfig, SerialTransport};
pub use tcp::TcpTransport;

use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;

/// Byte stream to a reader
///
/// Implementations move bytes only; framing belongs to the caller.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Connect to device
    async fn connect(&mut self) -> Result<()>;

    /// Disconnect from device
    async fn disconnect(&mut self) -> Result<()>;

    /// Check if connected
    fn is_connected(&self) -> bool;

    /// Send raw bytes
    async fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Receive whatever bytes arrive within `timeout`
    ///
    /// Returns at least one byte, or [`Error::ReadTimeout`] if nothing
    /// arrived in time.
    async fn receive(&mut self, timeout: Duration) -> Result<BytesMut>;

    /// Get remote address
    fn remote_addr(&self) -> String;
}
