//! Serial transport
//!
//! Desktop readers attach over USB and present a virtual COM port.
//! The reader speaks 8N1 without flow control at 115200 baud unless it has
//! been reconfigured.

use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::timeout;
use tokio_serial::{DataBits, FlowControl, Parity, SerialPortBuilderExt, SerialStream, StopBits};
use tracing::{debug, info, trace, warn};

use cfrust_core::constants::DEFAULT_BAUD_RATE;

use crate::{error::*, Transport};

/// Serial port configuration
#[derive(Debug, Clone)]
pub struct SerialConfig {
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub stop_bits: StopBits,
    pub parity: Parity,
    pub flow_control: FlowControl,
}

impl SerialConfig {
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            data_bits: DataBits::Eight,
            stop_bits: StopBits::One,
            parity: Parity::None,
            flow_control: FlowControl::None,
        }
    }
}

/// Serial transport for USB and RS-232 readers
pub struct SerialTransport {
    port_name: String,
    config: SerialConfig,
    port: Option<SerialStream>,
}

impl SerialTransport {
    const READ_CAPACITY: usize = 4 * 1024 + 16;

    /// Create a closed transport; [`Transport::connect`] opens the port
    pub fn new(port_name: impl Into<String>, config: SerialConfig) -> Self {
        Self {
            port_name: port_name.into(),
            config,
            port: None,
        }
    }

    /// Open `port_name` at `baud_rate` with 8N1 framing
    pub async fn open(port_name: impl Into<String>, baud_rate: u32) -> Result<Self> {
        let mut transport = Self::new(port_name, SerialConfig::default().with_baud_rate(baud_rate));
        transport.connect().await?;
        Ok(transport)
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    pub fn config(&self) -> &SerialConfig {
        &self.config
    }
}

#[async_trait]
impl Transport for SerialTransport {
    async fn connect(&mut self) -> Result<()> {
        if self.is_connected() {
            return Err(Error::AlreadyConnected);
        }

        debug!(
            port = %self.port_name,
            baud_rate = self.config.baud_rate,
            data_bits = ?self.config.data_bits,
            stop_bits = ?self.config.stop_bits,
            parity = ?self.config.parity,
            "Opening serial port"
        );

        let stream = tokio_serial::new(self.port_name.as_str(), self.config.baud_rate)
            .data_bits(self.config.data_bits)
            .stop_bits(self.config.stop_bits)
            .parity(self.config.parity)
            .flow_control(self.config.flow_control)
            .open_native_async()
            .map_err(|e| Error::PortOpen {
                port: self.port_name.clone(),
                reason: e.to_string(),
            })?;

        info!(port = %self.port_name, baud_rate = self.config.baud_rate, "Serial port opened");

        self.port = Some(stream);
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        if let Some(mut port) = self.port.take() {
            debug!(port = %self.port_name, "Closing serial port");

            if let Err(e) = port.flush().await {
                warn!(port = %self.port_name, error = %e, "Failed to flush before closing");
            }
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.port.is_some()
    }

    async fn send(&mut self, data: &[u8]) -> Result<()> {
        let port = self.port.as_mut().ok_or(Error::NotConnected)?;

        trace!(port = %self.port_name, bytes = data.len(), data = %hex::encode_upper(data), "Sending");

        port.write_all(data).await.map_err(Error::Write)?;
        port.flush().await.map_err(Error::Write)?;
        Ok(())
    }

    async fn receive(&mut self, timeout_duration: Duration) -> Result<BytesMut> {
        let port = self.port.as_mut().ok_or(Error::NotConnected)?;

        let mut buf = BytesMut::with_capacity(Self::READ_CAPACITY);
        let n = timeout(timeout_duration, port.read_buf(&mut buf))
            .await
            .map_err(|_| Error::ReadTimeout)?
            .map_err(Error::Io)?;

        if n == 0 {
            warn!(port = %self.port_name, "Serial port reported end of stream");
            self.port = None;
            return Err(Error::ConnectionClosed);
        }

        trace!(port = %self.port_name, bytes = n, data = %hex::encode_upper(&buf), "Received");
        Ok(buf)
    }

    fn remote_addr(&self) -> String {
        self.port_name.clone()
    }
}

impl Drop for SerialTransport {
    fn drop(&mut self) {
        if self.port.is_some() {
            debug!(port = %self.port_name, "Serial transport dropped, closing port");
        }
    }
}
