//! Scripted transport for exercising the protocol engine without hardware
//!
//! [`MockTransport`] plays back a queue of incoming events, one per
//! `receive()` call, and records every `send()`. The queue is shared with a
//! [`MockHandle`] so a test can keep scripting and inspecting after the
//! transport has been moved into a reader.
//!
//! ```
//! use cfrust_transport::MockTransport;
//!
//! let mock = MockTransport::new();
//! let handle = mock.handle();
//! handle.push_bytes(&[0xCF, 0xFF, 0x00, 0x03, 0x00, 0x52, 0x00, 0x00, 0x00]);
//! handle.push_silence();
//! ```

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;
use parking_lot::Mutex;
use tracing::trace;

use crate::{error::*, Transport};

#[derive(Debug, Clone)]
enum Incoming {
    /// Delivered by the next `receive()`
    Data(Vec<u8>),
    /// Next `receive()` waits out its timeout
    Silence,
    /// Peer closes the link
    Closed,
}

#[derive(Debug)]
struct MockState {
    incoming: VecDeque<Incoming>,
    sent: Vec<Vec<u8>>,
    connected: bool,
    fail_writes: bool,
}

/// Mock [`Transport`] backed by a shared script
///
/// With an empty script every `receive()` waits for its full timeout and
/// then reports [`Error::ReadTimeout`], like a reader that never answers.
#[derive(Debug)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

/// Test-side view of a [`MockTransport`]
#[derive(Debug, Clone)]
pub struct MockHandle {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    /// Create a connected mock with an empty script
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                incoming: VecDeque::new(),
                sent: Vec::new(),
                connected: true,
                fail_writes: false,
            })),
        }
    }

    pub fn handle(&self) -> MockHandle {
        MockHandle {
            state: Arc::clone(&self.state),
        }
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHandle {
    /// Queue bytes for one `receive()` call
    pub fn push_bytes(&self, data: &[u8]) {
        self.state.lock().incoming.push_back(Incoming::Data(data.to_vec()));
    }

    /// Queue bytes split into chunks of at most `chunk` bytes, one per `receive()`
    pub fn push_chunked(&self, data: &[u8], chunk: usize) {
        let mut state = self.state.lock();
        for part in data.chunks(chunk.max(1)) {
            state.incoming.push_back(Incoming::Data(part.to_vec()));
        }
    }

    /// Queue one `receive()` that times out
    pub fn push_silence(&self) {
        self.state.lock().incoming.push_back(Incoming::Silence);
    }

    /// Queue the peer closing the connection
    pub fn push_close(&self) {
        self.state.lock().incoming.push_back(Incoming::Closed);
    }

    /// Everything written so far, one entry per `send()`
    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.state.lock().sent.clone()
    }

    pub fn sent_count(&self) -> usize {
        self.state.lock().sent.len()
    }

    /// Scripted events not yet consumed
    pub fn pending(&self) -> usize {
        self.state.lock().incoming.len()
    }

    /// Make every following `send()` fail
    pub fn set_fail_writes(&self, fail: bool) {
        self.state.lock().fail_writes = fail;
    }

    pub fn set_connected(&self, connected: bool) {
        self.state.lock().connected = connected;
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn connect(&mut self) -> Result<()> {
        let mut state = self.state.lock();
        if state.connected {
            return Err(Error::AlreadyConnected);
        }
        state.connected = true;
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        self.state.lock().connected = false;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.state.lock().connected
    }

    async fn send(&mut self, data: &[u8]) -> Result<()> {
        let mut state = self.state.lock();
        if !state.connected {
            return Err(Error::NotConnected);
        }
        if state.fail_writes {
            return Err(Error::Write(std::io::Error::from(std::io::ErrorKind::BrokenPipe)));
        }

        trace!(bytes = data.len(), data = %hex::encode_upper(data), "Mock sent");
        state.sent.push(data.to_vec());
        Ok(())
    }

    async fn receive(&mut self, timeout: Duration) -> Result<BytesMut> {
        // The lock must not be held across the await below
        let next = {
            let mut state = self.state.lock();
            if !state.connected {
                return Err(Error::NotConnected);
            }
            state.incoming.pop_front()
        };

        match next {
            Some(Incoming::Data(data)) => Ok(BytesMut::from(data.as_slice())),
            Some(Incoming::Closed) => {
                self.state.lock().connected = false;
                Err(Error::ConnectionClosed)
            }
            Some(Incoming::Silence) | None => {
                tokio::time::sleep(timeout).await;
                Err(Error::ReadTimeout)
            }
        }
    }

    fn remote_addr(&self) -> String {
        "mock".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test]
    async fn test_scripted_receive() {
        let mut mock = MockTransport::new();
        let handle = mock.handle();
        handle.push_bytes(&[1, 2, 3]);
        handle.push_chunked(&[4, 5, 6, 7, 8], 2);

        assert_eq!(mock.receive(Duration::from_millis(10)).await.unwrap().as_ref(), &[1, 2, 3]);
        assert_eq!(mock.receive(Duration::from_millis(10)).await.unwrap().as_ref(), &[4, 5]);
        assert_eq!(handle.pending(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_silence_waits_for_timeout() {
        let mut mock = MockTransport::new();
        let start = Instant::now();

        let result = mock.receive(Duration::from_millis(50)).await;

        assert!(matches!(result, Err(Error::ReadTimeout)));
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_records_sends() {
        let mut mock = MockTransport::new();
        let handle = mock.handle();

        mock.send(&[0xCF, 0xFF]).await.unwrap();
        mock.send(&[0xCF, 0x01]).await.unwrap();

        assert_eq!(handle.sent(), vec![vec![0xCF, 0xFF], vec![0xCF, 0x01]]);
    }

    #[tokio::test]
    async fn test_failures() {
        let mut mock = MockTransport::new();
        let handle = mock.handle();

        handle.set_fail_writes(true);
        assert!(matches!(mock.send(&[0]).await, Err(Error::Write(_))));

        handle.push_close();
        assert!(matches!(
            mock.receive(Duration::from_millis(1)).await,
            Err(Error::ConnectionClosed)
        ));
        assert!(!mock.is_connected());
        assert!(matches!(mock.send(&[0]).await, Err(Error::NotConnected)));

        mock.connect().await.unwrap();
        assert!(mock.is_connected());
    }
}
