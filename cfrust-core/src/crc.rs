//! Frame CRC algorithm
//!
//! Reflected CRC-16/CCITT as used by the reader firmware:
//! 1. Start from the preset value 0xFFFF
//! 2. XOR each byte into the low byte of the register
//! 3. Shift right 8 times, XOR-ing in 0x8408 whenever the bit shifted out was set
//! 4. No final XOR; the register is transmitted little-endian

use tracing::trace;

/// Register preset
pub const PRESET_VALUE: u16 = 0xFFFF;

/// Reflected form of the CCITT polynomial 0x1021
pub const POLYNOMIAL: u16 = 0x8408;

/// Calculate the CRC of a byte span
///
/// # Examples
///
/// ```
/// use cfrust_core::crc;
///
/// assert_eq!(crc::crc16(&[]), 0xFFFF);
/// assert_eq!(crc::crc16(b"123456789"), 0x6F91);
/// ```
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc = PRESET_VALUE;

    for &byte in data {
        crc ^= byte as u16;

        for _ in 0..8 {
            if crc & 0x0001 != 0 {
                crc = (crc >> 1) ^ POLYNOMIAL;
            } else {
                crc >>= 1;
            }
        }
    }

    trace!(
        len = data.len(),
        crc = format!("0x{:04X}", crc),
        "Calculated CRC"
    );

    crc
}

/// Verify a span against a received CRC
pub fn verify(data: &[u8], expected: u16) -> bool {
    crc16(data) == expected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc_empty_is_preset() {
        assert_eq!(crc16(&[]), PRESET_VALUE);
    }

    #[test]
    fn test_crc_check_value() {
        // Catalogued check value for this parameter set (CRC-16/MCRF4XX)
        assert_eq!(crc16(b"123456789"), 0x6F91);
    }

    #[test]
    fn test_crc_get_info_request() {
        // ADDR | LEN | OPCODE of the GET_INFO request
        assert_eq!(crc16(&[0xFF, 0x00, 0x02, 0x00, 0x51]), 0x3366);
    }

    #[test]
    fn test_crc_deterministic() {
        let data = vec![0xCF, 0x01, 0x02, 0x03, 0x04];
        assert_eq!(crc16(&data), crc16(&data));
    }

    #[test]
    fn test_crc_verify() {
        let data = [0xAB, 0xCD];
        let crc = crc16(&data);

        assert!(verify(&data, crc));
        assert!(!verify(&data, crc.wrapping_add(1)));
    }

    #[test]
    fn test_crc_order_sensitive() {
        assert_ne!(crc16(&[0x01, 0x02]), crc16(&[0x02, 0x01]));
    }

    #[test]
    fn test_crc_detects_every_single_bit_flip() {
        let data = vec![0x55; 64];
        let reference = crc16(&data);

        for index in 0..data.len() {
            for bit in 0..8 {
                let mut corrupted = data.clone();
                corrupted[index] ^= 1 << bit;
                assert_ne!(crc16(&corrupted), reference, "byte {index} bit {bit}");
            }
        }
    }
}
