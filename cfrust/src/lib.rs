//! # cfrust
//!
//! Host-side protocol library for Chafon CF-series UHF RFID readers.
//!
//! ## Features
//!
//! - Framed, CRC-checked transactions with per-command timeouts
//! - Continuous inventory with streamed tag reports
//! - GB, ISO and multi-protocol command sets
//! - One closed set of error codes for every failure
//! - TCP and serial transports
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//! use cfrust::{InventoryRequest, Poll, Reader, ReaderConfig};
//!
//! #[tokio::main]
//! async fn main() -> cfrust::Result<()> {
//!     let mut reader = Reader::open_serial("/dev/ttyUSB0", 115_200, ReaderConfig::default()).await?;
//!
//!     reader.start_inventory(InventoryRequest::default()).await?;
//!     for _ in 0..10 {
//!         if let Poll::Tag(tag) = reader.poll_tag().await? {
//!             println!("{}", tag);
//!         }
//!     }
//!     reader.stop_inventory().await?;
//!
//!     reader.close().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod inventory;
pub mod link;
pub mod reader;

// Re-exports
pub use config::ReaderConfig;
pub use error::{Error, Result};
pub use inventory::{EmptyReason, InventorySession, Poll};
pub use link::Link;
pub use reader::Reader;

// Re-export types
pub use cfrust_core::{Command, ErrorCode, InventoryState, ProtocolFamily};
pub use cfrust_transport::{SerialTransport, TcpTransport, Transport};
pub use cfrust_types::{
    AntennaMask, DeviceInfo, FrequencyPlan, InventoryRequest, KillTagRequest, LockAction, LockArea,
    LockTagRequest, MemoryBank, ReadTagRequest, Region, RelayAction, RelayCommand, RfPower,
    SelectMask, TagReport, TagResponse, Temperature, WhitelistBegin, WhitelistOption,
    WriteTagRequest,
};
