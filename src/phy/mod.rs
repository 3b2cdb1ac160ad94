//! PHY framing and timing
//!
//! Stateless helpers shared by the packet preparation path and the event
//! dispatcher:
//!
//! - [`header`]: the 2-byte physical header (PHR) codec
//! - [`crc`]: bit-by-bit CRC-16 and CRC-32 used for the frame check sequence
//! - [`timing`]: GFSK time-on-air and symbol count formulas
//!
//! The RF engine shifts bytes out LSB first while the air format is MSB first,
//! so most of the framing goes through [`bit_reverse8`].

pub mod crc;
pub mod header;
pub mod timing;

pub use crc::{crc16, crc32};
pub use header::{decode_phr, encode_phr, HeaderError, PhyHeader, MAX_PHR_LENGTH, PHR_LENGTH};
pub use timing::{symbols_for_delay, time_on_air_ms};

/// Reverses the bit order of a byte
#[inline]
pub const fn bit_reverse8(n: u8) -> u8 {
    n.reverse_bits()
}

/// Reverses the bit order of each byte of a word and swaps the two bytes
///
/// Equivalent to a full 16-bit reversal.
#[inline]
pub const fn bit_reverse16(n: u16) -> u16 {
    (bit_reverse8((n >> 8) as u8) as u16) | ((bit_reverse8((n & 0xFF) as u8) as u16) << 8)
}
