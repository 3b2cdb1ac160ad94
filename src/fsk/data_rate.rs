//! Sidewalk data rates and their FSK profiles
//!
//! Only the 50, 150 and 250 kbps rates have an FSK profile on this
//! transceiver. The remaining rates exist so regional tables keep one slot per
//! stack-level data rate code.

use super::params::{Bandwidth, FskModulationParams, Shaping};
use crate::error::RadioError;

/// Number of data rate slots in a regional parameter table
pub const DATA_RATE_COUNT: usize = 6;

code_enum! {
    /// Stack-level data rate code
    DataRate, DataRateError {
        /// 2 kbps
        Kbps2 = 1,
        /// 22 kbps
        Kbps22 = 2,
        /// 50 kbps
        Kbps50 = 3,
        /// 150 kbps
        Kbps150 = 4,
        /// 250 kbps
        Kbps250 = 5,
        /// 12.5 kbps
        Kbps12_5 = 6,
    }
}

impl DataRate {
    /// Slot of this rate in a regional parameter table
    pub const fn index(self) -> usize {
        self as usize - 1
    }

    /// Whether this rate has an FSK profile on the transceiver
    pub const fn is_fsk(self) -> bool {
        matches!(self, Self::Kbps50 | Self::Kbps150 | Self::Kbps250)
    }
}

const PROFILES: [(DataRate, FskModulationParams); 3] = [
    (
        DataRate::Kbps50,
        FskModulationParams {
            bit_rate: 50_000,
            freq_dev: 25_000,
            bandwidth: Bandwidth::Bw156200,
            shaping: Shaping::Bt1,
        },
    ),
    (
        DataRate::Kbps150,
        FskModulationParams {
            bit_rate: 150_000,
            freq_dev: 37_500,
            bandwidth: Bandwidth::Bw312000,
            shaping: Shaping::Bt05,
        },
    ),
    (
        DataRate::Kbps250,
        FskModulationParams {
            bit_rate: 250_000,
            freq_dev: 62_500,
            bandwidth: Bandwidth::Bw467000,
            shaping: Shaping::Bt05,
        },
    ),
];

/// Modulation parameters of the FSK profile for `data_rate`
///
/// # Errors
/// * `RadioError::InvalidParams` - the rate has no FSK profile
pub fn data_rate_to_mod_params(data_rate: DataRate) -> Result<FskModulationParams, RadioError> {
    PROFILES
        .iter()
        .find(|(rate, _)| *rate == data_rate)
        .map(|(_, params)| *params)
        .ok_or(RadioError::InvalidParams)
}

/// Data rate whose profile matches the bit rate, deviation and bandwidth of
/// `params`
///
/// Pulse shaping is not compared. Returns `None` for any other combination.
pub fn mod_params_to_data_rate(params: &FskModulationParams) -> Option<DataRate> {
    PROFILES
        .iter()
        .find(|(_, profile)| {
            profile.bit_rate == params.bit_rate
                && profile.freq_dev == params.freq_dev
                && profile.bandwidth == params.bandwidth
        })
        .map(|(rate, _)| *rate)
}
