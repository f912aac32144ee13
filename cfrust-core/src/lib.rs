//! # cfrust-core
//!
//! Core protocol implementation for CF-series UHF RFID readers.
//!
//! This crate provides the low-level protocol primitives:
//! - Frame structure and encoding/decoding
//! - CRC-16 calculation
//! - Command registry, scoped by protocol family
//! - Host-facing error codes and status classification
//! - Inventory session bookkeeping

pub mod command;
pub mod constants;
pub mod crc;
pub mod error;
pub mod frame_buffer;
pub mod packet;
pub mod session;
pub mod status;

pub use command::{Command, CommandDescriptor, ProtocolFamily, Scope};
pub use error::{Error, FrameError, Result};
pub use frame_buffer::FrameBuffer;
pub use packet::{FrameKind, Packet};
pub use session::{InventoryState, Session};
pub use status::{ErrorCode, ErrorKind, StatusContext, TagFamily};
