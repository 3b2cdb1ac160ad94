//! Frame check sequence CRCs
//!
//! Both CRCs are computed MSB first, one bit at a time, so they match the
//! receiver's hardware decoder exactly.
//!
//! - CRC-16: polynomial `0x1021`, seed `0x0000`, no final XOR
//! - CRC-32: polynomial `0x04C11DB7`, seed `0xFFFFFFFF`, final complement
//!
//! An empty buffer yields `0` for both.

const POLYNOMIAL_CRC16: u16 = 0x1021;
const POLYNOMIAL_CRC32: u32 = 0x04C1_1DB7;

/// Shortest input the CRC-32 processes; shorter buffers are padded with zeros
const CRC32_MIN_INPUT: usize = 4;

/// Computes the CRC-16 of `buffer`
pub fn crc16(buffer: &[u8]) -> u16 {
    if buffer.is_empty() {
        return 0;
    }

    let mut crc: u16 = 0x0000;
    for &byte in buffer {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ POLYNOMIAL_CRC16
            } else {
                crc << 1
            };
        }
    }
    crc
}

/// Computes the CRC-32 of `buffer`
///
/// # Important Notes
/// - Inputs shorter than 4 bytes are processed as if zero-padded to 4 bytes
pub fn crc32(buffer: &[u8]) -> u32 {
    if buffer.is_empty() {
        return 0;
    }

    let rounds = buffer.len().max(CRC32_MIN_INPUT);
    let mut crc: u32 = 0xFFFF_FFFF;
    for index in 0..rounds {
        crc ^= buffer.get(index).map_or(0, |&byte| (byte as u32) << 24);
        for _ in 0..8 {
            crc = if crc & 0x8000_0000 != 0 {
                (crc << 1) ^ POLYNOMIAL_CRC32
            } else {
                crc << 1
            };
        }
    }
    !crc
}
