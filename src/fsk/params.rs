//! GFSK modulation and packet parameters
//!
//! The stack hands these over as plain value objects. Each field that selects
//! a hardware setting is a typed enumeration whose discriminant is the code the
//! RF engine expects, and every enumeration converts from its raw code through
//! [`TryFrom<u8>`] so malformed stack input is rejected before it reaches the
//! engine.

code_enum! {
    /// Gaussian pulse shaping filter
    Shaping, ShapingError {
        /// No filter
        Off = 0x00,
        /// Gaussian BT 0.3
        Bt03 = 0x08,
        /// Gaussian BT 0.5
        Bt05 = 0x09,
        /// Gaussian BT 0.7
        Bt07 = 0x0A,
        /// Gaussian BT 1.0
        Bt1 = 0x0B,
    }
}

code_enum! {
    /// Double side band receiver bandwidth
    Bandwidth, BandwidthError {
        /// 4.8 kHz
        Bw4800 = 0x1F,
        /// 5.8 kHz
        Bw5800 = 0x17,
        /// 7.3 kHz
        Bw7300 = 0x0F,
        /// 9.7 kHz
        Bw9700 = 0x1E,
        /// 11.7 kHz
        Bw11700 = 0x16,
        /// 14.6 kHz
        Bw14600 = 0x0E,
        /// 19.5 kHz
        Bw19500 = 0x1D,
        /// 23.4 kHz
        Bw23400 = 0x15,
        /// 29.3 kHz
        Bw29300 = 0x0D,
        /// 39.0 kHz
        Bw39000 = 0x1C,
        /// 46.9 kHz
        Bw46900 = 0x14,
        /// 58.6 kHz
        Bw58600 = 0x0C,
        /// 78.2 kHz
        Bw78200 = 0x1B,
        /// 93.8 kHz
        Bw93800 = 0x13,
        /// 117.3 kHz
        Bw117300 = 0x0B,
        /// 156.2 kHz
        Bw156200 = 0x1A,
        /// 187.2 kHz
        Bw187200 = 0x12,
        /// 234.3 kHz
        Bw234300 = 0x0A,
        /// 312.0 kHz
        Bw312000 = 0x19,
        /// 373.6 kHz
        Bw373600 = 0x11,
        /// 467.0 kHz
        Bw467000 = 0x09,
    }
}

code_enum! {
    /// Minimum preamble length the detector must see before looking for sync
    PreambleDetect, PreambleDetectError {
        /// Detector off
        Off = 0x00,
        /// 8 bits
        Bits8 = 0x04,
        /// 16 bits
        Bits16 = 0x05,
        /// 24 bits
        Bits24 = 0x06,
        /// 32 bits
        Bits32 = 0x07,
    }
}

code_enum! {
    /// Address filtering applied after the sync word
    AddressFilter, AddressFilterError {
        /// No filtering
        Off = 0x00,
        /// Node address only
        Node = 0x01,
        /// Node and broadcast addresses
        NodeAndBroadcast = 0x02,
    }
}

code_enum! {
    /// Packet length mode
    HeaderMode, HeaderModeError {
        /// Length known on both sides, no header byte
        Fixed = 0x00,
        /// Variable length, a length byte is sent
        Variable = 0x01,
    }
}

code_enum! {
    /// Hardware CRC appended by the engine
    CrcType, CrcTypeError {
        /// No CRC
        Off = 0x01,
        /// 1 byte CRC
        OneByte = 0x00,
        /// 2 byte CRC
        TwoBytes = 0x02,
        /// 1 byte CRC, inverted
        OneByteInverted = 0x04,
        /// 2 byte CRC, inverted
        TwoBytesInverted = 0x06,
    }
}

code_enum! {
    /// DC free encoding
    Whitening, WhiteningError {
        /// Off
        Off = 0x00,
        /// Whitening
        Enabled = 0x01,
    }
}

impl CrcType {
    /// Number of bytes the CRC occupies on air
    pub const fn len_in_bytes(self) -> u8 {
        match self {
            Self::Off => 0,
            Self::OneByte | Self::OneByteInverted => 1,
            Self::TwoBytes | Self::TwoBytesInverted => 2,
        }
    }
}

/// GFSK modulation parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FskModulationParams {
    /// Bit rate in bits per second
    pub bit_rate: u32,
    /// Frequency deviation in Hz
    pub freq_dev: u32,
    /// Receiver bandwidth
    pub bandwidth: Bandwidth,
    /// Pulse shaping
    pub shaping: Shaping,
}

/// GFSK packet parameters
///
/// Lengths follow the stack's convention: preamble and sync word are in
/// bytes and converted to bits when a formula needs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FskPacketParams {
    /// Preamble length in bytes
    pub preamble_length: u16,
    /// Preamble detector length
    pub preamble_min_detect: PreambleDetect,
    /// Sync word length in bytes
    pub sync_word_length: u8,
    /// Address filtering
    pub addr_comp: AddressFilter,
    /// Fixed or variable length
    pub header_type: HeaderMode,
    /// Payload length in bytes
    pub payload_length: u8,
    /// Hardware CRC
    pub crc_type: CrcType,
    /// DC free encoding
    pub whitening: Whitening,
}

impl Default for FskPacketParams {
    fn default() -> Self {
        Self {
            preamble_length: 0,
            preamble_min_detect: PreambleDetect::Off,
            sync_word_length: 0,
            addr_comp: AddressFilter::Off,
            header_type: HeaderMode::Fixed,
            payload_length: 0,
            crc_type: CrcType::Off,
            whitening: Whitening::Off,
        }
    }
}

impl FskPacketParams {
    /// Preamble length in bits
    pub const fn preamble_bits(&self) -> u32 {
        (self.preamble_length as u32) << 3
    }

    /// Sync word length in bits
    pub const fn sync_word_bits(&self) -> u32 {
        (self.sync_word_length as u32) << 3
    }
}
