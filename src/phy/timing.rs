//! GFSK timing formulas

use crate::fsk::{AddressFilter, FskModulationParams, FskPacketParams, HeaderMode};

/// Predicted time-on-air of a frame in milliseconds, rounded up
///
/// The frame is counted as preamble, an optional length byte for variable
/// length packets, the sync word, then payload, optional address byte and
/// hardware CRC. Whitening does not change the framed length.
///
/// Returns `0` when the bit rate is zero.
pub fn time_on_air_ms(packet: &FskPacketParams, modulation: &FskModulationParams) -> u32 {
    if modulation.bit_rate == 0 {
        return 0;
    }

    let header_bits = match packet.header_type {
        HeaderMode::Variable => 8,
        HeaderMode::Fixed => 0,
    };
    let address_bytes = match packet.addr_comp {
        AddressFilter::Off => 0,
        AddressFilter::Node | AddressFilter::NodeAndBroadcast => 1,
    };
    let body_bytes =
        packet.payload_length as u64 + address_bytes + packet.crc_type.len_in_bytes() as u64;

    let bits = packet.preamble_bits() as u64
        + header_bits
        + packet.sync_word_bits() as u64
        + (body_bytes << 3);

    (bits * 1000).div_ceil(modulation.bit_rate as u64) as u32
}

/// Number of whole symbols transmitted at `bit_rate` within `delay_us`
pub fn symbols_for_delay(bit_rate: u32, delay_us: u32) -> u32 {
    (delay_us as u64 * bit_rate as u64 / 1_000_000) as u32
}
