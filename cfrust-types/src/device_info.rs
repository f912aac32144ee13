//! Device information structures

use std::fmt;

use bytes::Bytes;

use crate::error::{ensure_len, Result};

/// Device information returned by `GET_INFO`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Firmware version
    pub firmware_version: String,

    /// Hardware version
    pub hardware_version: String,

    /// Device serial number (hex)
    pub serial_number: String,

    /// Trailing parameter block, if the firmware sends one
    pub extra: Bytes,
}

impl DeviceInfo {
    const VERSION_SIZE: usize = 32;
    const SERIAL_SIZE: usize = 12;

    /// Fixed part of the payload
    pub const SIZE: usize = Self::VERSION_SIZE * 2 + Self::SERIAL_SIZE;

    /// Parse `firmware[32] | hardware[32] | SN[12] | extra...`
    pub fn decode(payload: &[u8]) -> Result<Self> {
        ensure_len("device info", payload, Self::SIZE)?;

        let (firmware, rest) = payload.split_at(Self::VERSION_SIZE);
        let (hardware, rest) = rest.split_at(Self::VERSION_SIZE);
        let (serial, extra) = rest.split_at(Self::SERIAL_SIZE);

        Ok(Self {
            firmware_version: c_string(firmware),
            hardware_version: c_string(hardware),
            serial_number: hex::encode_upper(serial),
            extra: Bytes::copy_from_slice(extra),
        })
    }
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Device[SN: {}, FW: {}, HW: {}]",
            self.serial_number, self.firmware_version, self.hardware_version
        )
    }
}

/// NUL-terminated, possibly padded, ASCII field
fn c_string(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).trim().to_string()
}
