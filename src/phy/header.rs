//! Physical header (PHR) codec
//!
//! The PHR is two bytes sent ahead of every FSK frame:
//!
//! ```text
//!  byte 0 (before reversal)              byte 1 (before reversal)
//!  7    6    5    4    3    2..0         7..0
//!  MS   -    -    CRC  WHT  LEN[10:8]    LEN[7:0]
//! ```
//!
//! Both bytes are bit-reversed on the wire so the receiver's hardware decoder
//! sees them MSB first.

use core::convert::Infallible;

use regiface::{FromByteArray, ToByteArray};

use super::bit_reverse8;

/// Length of the encoded PHR in bytes
pub const PHR_LENGTH: usize = 2;

/// Largest length the 11-bit PHR field can carry
pub const MAX_PHR_LENGTH: u16 = 0x07FF;

const MODE_SWITCH_BIT: u8 = 1 << 7;
const CRC_BIT: u8 = 1 << 4;
const WHITENING_BIT: u8 = 1 << 3;
const LENGTH_HIGH_MASK: u8 = 0x07;

/// Error produced when a header cannot be encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HeaderError {
    /// The length does not fit the 11-bit field
    LengthOutOfRange(u16),
}

/// Decoded physical header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhyHeader {
    /// Mode switch frame
    pub mode_switch: bool,
    /// Set when the frame check sequence is a CRC-16, clear for CRC-32
    pub crc_enabled: bool,
    /// Payload is whitened
    pub whitening: bool,
    /// Number of PSDU bytes following the header (payload plus FCS)
    pub length: u16,
}

impl ToByteArray for PhyHeader {
    type Error = HeaderError;
    type Array = [u8; PHR_LENGTH];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        if self.length > MAX_PHR_LENGTH {
            return Err(HeaderError::LengthOutOfRange(self.length));
        }

        let mut flags = ((self.length >> 8) as u8) & LENGTH_HIGH_MASK;
        if self.mode_switch {
            flags |= MODE_SWITCH_BIT;
        }
        if self.crc_enabled {
            flags |= CRC_BIT;
        }
        if self.whitening {
            flags |= WHITENING_BIT;
        }

        Ok([bit_reverse8(flags), bit_reverse8((self.length & 0xFF) as u8)])
    }
}

impl FromByteArray for PhyHeader {
    type Error = Infallible;
    type Array = [u8; PHR_LENGTH];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        let flags = bit_reverse8(bytes[0]);
        let low = bit_reverse8(bytes[1]);

        Ok(Self {
            mode_switch: flags & MODE_SWITCH_BIT != 0,
            crc_enabled: flags & CRC_BIT != 0,
            whitening: flags & WHITENING_BIT != 0,
            length: (((flags & LENGTH_HIGH_MASK) as u16) << 8) | low as u16,
        })
    }
}

impl PhyHeader {
    /// Frame check sequence selector carried in the upper nibble of the
    /// un-reversed first byte.
    ///
    /// `0` selects CRC-32 and `1` CRC-16. A set mode switch bit or any reserved
    /// bit yields a code no receiver understands.
    pub fn fcs_code(phr: [u8; PHR_LENGTH]) -> u8 {
        bit_reverse8(phr[0]) >> 4
    }
}

/// Packs the flag bits and an 11-bit length into an on-air PHR
pub fn encode_phr(
    mode_switch: bool,
    crc_enabled: bool,
    whitening: bool,
    length: u16,
) -> Result<[u8; PHR_LENGTH], HeaderError> {
    PhyHeader {
        mode_switch,
        crc_enabled,
        whitening,
        length,
    }
    .to_bytes()
}

/// Unpacks an on-air PHR
pub fn decode_phr(phr: [u8; PHR_LENGTH]) -> PhyHeader {
    match PhyHeader::from_bytes(phr) {
        Ok(header) => header,
        Err(never) => match never {},
    }
}
