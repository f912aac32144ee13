//! Protocol constants

/// Broadcast address; every reader answers it
pub const DEVICE_ADDR: u8 = 0xFF;

/// Default TCP port of networked readers
pub const DEFAULT_TCP_PORT: u16 = 4001;

/// Default serial baud rate
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Command type byte of combined set/get commands
pub const TYPE_SET: u8 = 0x01;
pub const TYPE_GET: u8 = 0x02;

/// Vendor timeouts (milliseconds)
pub mod timeouts {
    /// Ordinary command round trip
    pub const COMMON_TIMEOUT: u64 = 2000;

    pub const TIMEOUT_5000: u64 = 5000;

    /// Default wait for one streamed inventory report
    pub const POLL_TIMEOUT: u64 = 1000;

    /// TCP connect
    pub const CONNECT_TIMEOUT: u64 = 5000;
}

/// Relay control values
pub mod relay {
    pub const RELEASE: u8 = 0x00;
    pub const CLOSE: u8 = 0x01;
}
