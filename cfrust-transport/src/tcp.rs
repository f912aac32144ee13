//! TCP transport

use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, trace, warn};

use cfrust_core::constants::{timeouts, DEFAULT_TCP_PORT};

use crate::{error::*, Transport};

/// TCP transport for networked readers
pub struct TcpTransport {
    addr: String,
    port: u16,
    socket_addr: Option<SocketAddr>,
    stream: Option<TcpStream>,
    connect_timeout: Duration,
}

impl TcpTransport {
    /// Read buffer size; one large frame fits
    const READ_CAPACITY: usize = 4 * 1024 + 16;

    /// Create new TCP transport
    pub fn new(addr: impl Into<String>, port: u16) -> Self {
        Self {
            addr: addr.into(),
            port,
            socket_addr: None,
            stream: None,
            connect_timeout: Duration::from_millis(timeouts::CONNECT_TIMEOUT),
        }
    }

    /// Transport to the default reader port
    pub fn with_default_port(addr: impl Into<String>) -> Self {
        Self::new(addr, DEFAULT_TCP_PORT)
    }

    /// Set connection timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Resolve address to SocketAddr
    async fn resolve_addr(&mut self) -> Result<SocketAddr> {
        if let Some(addr) = self.socket_addr {
            return Ok(addr);
        }

        let addr_str = format!("{}:{}", self.addr, self.port);

        let addr = tokio::net::lookup_host(&addr_str)
            .await
            .map_err(|e| Error::InvalidAddress(format!("{}: {}", addr_str, e)))?
            .next()
            .ok_or_else(|| Error::InvalidAddress(format!("No addresses found for {}", addr_str)))?;

        self.socket_addr = Some(addr);
        Ok(addr)
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn connect(&mut self) -> Result<()> {
        if self.is_connected() {
            return Err(Error::AlreadyConnected);
        }

        let addr = self.resolve_addr().await?;

        debug!("Connecting to {}...", addr);

        let stream = timeout(self.connect_timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| Error::ConnectionTimeout)?
            .map_err(|e| Error::PortOpen {
                port: addr.to_string(),
                reason: e.to_string(),
            })?;

        // Frames are small and latency bound
        stream.set_nodelay(true)?;

        debug!("Connected to {}", addr);

        self.stream = Some(stream);
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        if let Some(mut stream) = self.stream.take() {
            debug!("Disconnecting from {}...", self.remote_addr());

            let _ = stream.shutdown().await;
        }

        self.socket_addr = None;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    async fn send(&mut self, data: &[u8]) -> Result<()> {
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;

        trace!(bytes = data.len(), data = %hex::encode_upper(data), "Sending");

        stream.write_all(data).await.map_err(Error::Write)?;
        stream.flush().await.map_err(Error::Write)?;

        Ok(())
    }

    async fn receive(&mut self, timeout_duration: Duration) -> Result<BytesMut> {
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;

        let mut buf = BytesMut::with_capacity(Self::READ_CAPACITY);

        let n = timeout(timeout_duration, stream.read_buf(&mut buf))
            .await
            .map_err(|_| Error::ReadTimeout)?
            .map_err(Error::Io)?;

        if n == 0 {
            warn!("Reader at {} closed the connection", self.addr);
            self.stream = None;
            return Err(Error::ConnectionClosed);
        }

        trace!(bytes = n, data = %hex::encode_upper(&buf), "Received");

        Ok(buf)
    }

    fn remote_addr(&self) -> String {
        self.socket_addr
            .map(|addr| addr.to_string())
            .unwrap_or_else(|| format!("{}:{}", self.addr, self.port))
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        if self.is_connected() {
            warn!("TCP transport dropped while still connected");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_tcp_transport_create() {
        let transport = TcpTransport::with_default_port("192.168.1.200");
        assert!(!transport.is_connected());
        assert_eq!(transport.remote_addr(), "192.168.1.200:4001");
    }

    #[tokio::test]
    async fn test_tcp_transport_invalid_address() {
        let mut transport = TcpTransport::new("invalid..address", 4001)
            .with_connect_timeout(Duration::from_millis(100));

        let result = transport.connect().await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_tcp_round_trip() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 8];
            socket.read_exact(&mut buf).await.unwrap();
            socket.write_all(&buf).await.unwrap();
        });

        let mut transport = TcpTransport::new("127.0.0.1", port);
        transport.connect().await.unwrap();
        assert!(matches!(transport.connect().await, Err(Error::AlreadyConnected)));

        let frame = [0xCF, 0xFF, 0x00, 0x02, 0x00, 0x51, 0x66, 0x33];
        transport.send(&frame).await.unwrap();

        let mut received = BytesMut::new();
        while received.len() < frame.len() {
            received.extend_from_slice(&transport.receive(Duration::from_secs(1)).await.unwrap());
        }
        assert_eq!(received.as_ref(), &frame);

        server.await.unwrap();
        assert!(matches!(
            transport.receive(Duration::from_secs(1)).await,
            Err(Error::ConnectionClosed)
        ));
        assert!(!transport.is_connected());
    }

    #[tokio::test]
    async fn test_receive_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_millis(300)).await;
            drop(socket);
        });

        let mut transport = TcpTransport::new("127.0.0.1", port);
        transport.connect().await.unwrap();

        assert!(matches!(
            transport.receive(Duration::from_millis(50)).await,
            Err(Error::ReadTimeout)
        ));

        transport.disconnect().await.unwrap();
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_send_requires_connection() {
        let mut transport = TcpTransport::new("127.0.0.1", 4001);
        assert!(matches!(transport.send(&[0xCF]).await, Err(Error::NotConnected)));
    }
}
