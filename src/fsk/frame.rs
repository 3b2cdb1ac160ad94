//! FSK PHY frames
//!
//! A frame on air is the [PHR](crate::phy::PhyHeader), the payload and a
//! frame check sequence (CRC-32 or CRC-16, big endian). The hardware CRC and
//! length handling are turned off; the driver builds the whole frame itself.
//!
//! TX preparation works in place on the caller's buffer. RX parsing copies the
//! payload out of the raw engine bytes, restoring MSB first bit order.

use core::time::Duration;

use super::params::{AddressFilter, CrcType, FskPacketParams, HeaderMode, PreambleDetect, Whitening};
use crate::error::RadioError;
use crate::phy::{bit_reverse8, crc16, crc32, decode_phr, encode_phr, PhyHeader, PHR_LENGTH};

/// Largest frame the engine accepts, PHR included
pub const MAX_FRAME_LENGTH: usize = 255;

/// Noise floor used to derive the RX status of a packet, in dBm
pub const RF_NOISE_FLOOR: i8 = -90;

/// Length of the sync word programmed for Sidewalk frames
pub const SYNC_WORD_LENGTH: usize = 3;

code_enum! {
    /// Frame check sequence selector carried in the PHR
    FcsType, FcsTypeError {
        /// 4 byte CRC-32
        Crc32 = 0,
        /// 2 byte CRC-16
        Crc16 = 1,
    }
}

impl FcsType {
    /// Number of FCS bytes following the payload
    pub const fn len_in_bytes(self) -> usize {
        match self {
            Self::Crc32 => 4,
            Self::Crc16 => 2,
        }
    }

    /// Largest payload that still fits a frame with this FCS
    pub const fn max_payload(self) -> usize {
        MAX_FRAME_LENGTH - PHR_LENGTH - self.len_in_bytes()
    }
}

/// Stack-level description of the PHR to send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FskPhyHeader {
    /// Frame check sequence
    pub fcs_type: FcsType,
    /// Payload is whitened
    pub is_data_whitening_enabled: bool,
    /// Payload is FEC encoded, selects the sync word
    pub is_fec_enabled: bool,
}

/// Errors detected while parsing a received frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Fewer bytes than the PHR, or a PHR length shorter than its FCS
    TooShort,
    /// More bytes than [`MAX_FRAME_LENGTH`]
    TooLong,
    /// The PHR announces more bytes than were received
    Truncated,
    /// The PHR carries an FCS selector no receiver understands
    UnknownFcs(u8),
    /// The PHR announces an empty PSDU
    EmptyPayload,
}

/// Result of parsing a received frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ParsedFrame {
    /// Frame check sequence announced by the PHR
    pub fcs_type: FcsType,
    /// Whitening flag announced by the PHR
    pub whitening: bool,
    /// Payload length, FCS excluded
    pub payload_len: u8,
}

/// Signal quality of the last received FSK packet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FskRxPacketStatus {
    /// RSSI above [`RF_NOISE_FLOOR`]
    pub rx_status: i8,
    /// RSSI at sync, in dBm
    pub rssi_sync: i8,
    /// Running RSSI average, in dBm
    pub rssi_avg: i8,
}

/// Receive buffer owned by the stack and filled in place by the driver
#[derive(Debug, Clone)]
pub struct RxPacket {
    /// Payload bytes, MSB first
    pub payload: [u8; MAX_FRAME_LENGTH],
    /// Number of valid bytes in `payload`
    pub payload_len: u8,
    /// Signal quality
    pub fsk_status: FskRxPacketStatus,
    /// Uptime when the packet was received, if the client keeps a clock
    pub received_at: Option<Duration>,
}

impl RxPacket {
    pub const fn new() -> Self {
        Self {
            payload: [0; MAX_FRAME_LENGTH],
            payload_len: 0,
            fsk_status: FskRxPacketStatus {
                rx_status: 0,
                rssi_sync: 0,
                rssi_avg: 0,
            },
            received_at: None,
        }
    }

    /// The valid part of the payload
    pub fn payload(&self) -> &[u8] {
        &self.payload[..self.payload_len as usize]
    }
}

impl Default for RxPacket {
    fn default() -> Self {
        Self::new()
    }
}

/// Sync word for Sidewalk FSK frames
///
/// The leading `0x55` forces a real preamble polarity.
pub const fn sync_word(fec_enabled: bool) -> [u8; SYNC_WORD_LENGTH] {
    [0x55, if fec_enabled { 0x6F } else { 0x90 }, 0x4E]
}

fn apply_frame_defaults(params: &mut FskPacketParams) {
    params.preamble_min_detect = PreambleDetect::Bits16;
    params.sync_word_length = SYNC_WORD_LENGTH as u8;
    params.addr_comp = AddressFilter::Off;
    params.header_type = HeaderMode::Fixed;
    params.crc_type = CrcType::Off;
    params.whitening = Whitening::Off;
}

/// Fills in the packet parameters for receiving Sidewalk frames and returns
/// the sync word to program
pub fn prepare_for_rx(
    phy_header: &FskPhyHeader,
    params: &mut FskPacketParams,
) -> [u8; SYNC_WORD_LENGTH] {
    apply_frame_defaults(params);
    params.payload_length = MAX_FRAME_LENGTH as u8;
    sync_word(phy_header.is_fec_enabled)
}

/// Builds a complete frame in place and returns the sync word to program
///
/// On entry `buffer` holds `params.payload_length` payload bytes. On success it
/// holds PHR, payload and FCS, and `params.payload_length` is the frame length.
///
/// # Errors
/// * `RadioError::InvalidParams` - empty payload, zero preamble, payload too
///   long for the FCS, or `buffer` too small for the frame
pub fn prepare_for_tx(
    phy_header: &FskPhyHeader,
    params: &mut FskPacketParams,
    buffer: &mut [u8],
) -> Result<[u8; SYNC_WORD_LENGTH], RadioError> {
    let payload_len = params.payload_length as usize;
    if payload_len == 0 || params.preamble_length == 0 {
        return Err(RadioError::InvalidParams);
    }

    let fcs_type = phy_header.fcs_type;
    if payload_len > fcs_type.max_payload() {
        return Err(RadioError::InvalidParams);
    }

    let psdu_len = payload_len + fcs_type.len_in_bytes();
    let frame_len = PHR_LENGTH + psdu_len;
    if buffer.len() < frame_len {
        return Err(RadioError::InvalidParams);
    }

    let payload = &buffer[..payload_len];
    let fcs_offset = PHR_LENGTH + payload_len;
    let mut fcs = [0u8; 4];
    match fcs_type {
        FcsType::Crc32 => fcs.copy_from_slice(&crc32(payload).to_be_bytes()),
        FcsType::Crc16 => fcs[..2].copy_from_slice(&crc16(payload).to_be_bytes()),
    }

    let phr = encode_phr(
        false,
        fcs_type == FcsType::Crc16,
        phy_header.is_data_whitening_enabled,
        psdu_len as u16,
    )
    .map_err(|_| RadioError::InvalidParams)?;

    buffer.copy_within(..payload_len, PHR_LENGTH);
    buffer[..PHR_LENGTH].copy_from_slice(&phr);
    buffer[fcs_offset..frame_len].copy_from_slice(&fcs[..fcs_type.len_in_bytes()]);

    apply_frame_defaults(params);
    params.payload_length = frame_len as u8;

    Ok(sync_word(phy_header.is_fec_enabled))
}

/// Parses a raw frame read from the engine's RX FIFO
///
/// Every byte after the PHR is copied into `payload` with its bit order
/// reversed, FCS included. The returned length excludes the FCS.
pub fn parse_rx_frame(
    raw: &[u8],
    payload: &mut [u8; MAX_FRAME_LENGTH],
) -> Result<ParsedFrame, FrameError> {
    if raw.len() > MAX_FRAME_LENGTH {
        return Err(FrameError::TooLong);
    }
    if raw.len() < PHR_LENGTH {
        return Err(FrameError::TooShort);
    }

    let body = &raw[PHR_LENGTH..];
    for (dst, src) in payload.iter_mut().zip(body) {
        *dst = bit_reverse8(*src);
    }

    let phr = [raw[0], raw[1]];
    let header = decode_phr(phr);
    if header.length == 0 {
        return Err(FrameError::EmptyPayload);
    }
    if header.length as usize > body.len() {
        return Err(FrameError::Truncated);
    }

    let code = PhyHeader::fcs_code(phr);
    let fcs_type = FcsType::try_from(code).map_err(|_| FrameError::UnknownFcs(code))?;
    let payload_len = (header.length as usize)
        .checked_sub(fcs_type.len_in_bytes())
        .ok_or(FrameError::TooShort)?;

    Ok(ParsedFrame {
        fcs_type,
        whitening: header.whitening,
        payload_len: payload_len as u8,
    })
}

/// Folds a new RSSI sample into a running average
///
/// The average is the midpoint of the previous average and the new sample;
/// an average of `0` means no sample yet.
pub fn running_rssi_average(average: i8, rssi: i8) -> i8 {
    if average == 0 {
        rssi
    } else {
        ((average as i16 + rssi as i16) / 2) as i8
    }
}
