//! Reader configuration

use std::time::Duration;

use cfrust_core::constants::{timeouts, DEVICE_ADDR};
use cfrust_core::ProtocolFamily;

/// Settings of one [`Reader`](crate::Reader) handle
///
/// ```
/// use std::time::Duration;
/// use cfrust::{ProtocolFamily, ReaderConfig};
///
/// let config = ReaderConfig::default()
///     .with_family(ProtocolFamily::Gb)
///     .with_poll_timeout(Duration::from_millis(500));
/// assert_eq!(config.address, 0xFF);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Device address; 0xFF reaches any reader on the link
    pub address: u8,

    /// Air-interface command set tag commands are resolved in
    pub family: ProtocolFamily,

    /// Overrides every command's own timeout when set
    pub command_timeout: Option<Duration>,

    /// Wait for one streamed inventory report
    pub poll_timeout: Duration,

    /// Wait for the inventory stop acknowledgement
    pub stop_timeout: Duration,
}

impl ReaderConfig {
    pub fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    pub fn with_family(mut self, family: ProtocolFamily) -> Self {
        self.family = family;
        self
    }

    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = Some(timeout);
        self
    }

    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }

    pub fn with_stop_timeout(mut self, timeout: Duration) -> Self {
        self.stop_timeout = timeout;
        self
    }

    /// Timeout for a command whose own default is `default`
    pub fn timeout_for(&self, default: Duration) -> Duration {
        self.command_timeout.unwrap_or(default)
    }
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            address: DEVICE_ADDR,
            family: ProtocolFamily::Iso,
            command_timeout: None,
            poll_timeout: Duration::from_millis(timeouts::POLL_TIMEOUT),
            stop_timeout: Duration::from_millis(timeouts::TIMEOUT_5000),
        }
    }
}
