//! FSK modem support
//!
//! - [`params`]: modulation and packet parameters with their hardware codes
//! - [`data_rate`]: the three Sidewalk FSK profiles and regional table indexing
//! - [`frame`]: PHY frame preparation for TX and parsing for RX

pub mod data_rate;
pub mod frame;
pub mod params;

pub use data_rate::{data_rate_to_mod_params, mod_params_to_data_rate, DataRate, DATA_RATE_COUNT};
pub use frame::{
    parse_rx_frame, prepare_for_rx, prepare_for_tx, running_rssi_average, sync_word, FcsType,
    FrameError, FskPhyHeader, FskRxPacketStatus, ParsedFrame, RxPacket, MAX_FRAME_LENGTH,
    RF_NOISE_FLOOR, SYNC_WORD_LENGTH,
};
pub use params::{
    AddressFilter, Bandwidth, CrcType, FskModulationParams, FskPacketParams, HeaderMode,
    PreambleDetect, Shaping, Whitening,
};
