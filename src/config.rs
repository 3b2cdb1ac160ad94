//! Device configuration
//!
//! Everything the board integrator decides before the radio is brought up:
//!
//! - [`RegionalConfig`]: default region and the per-region limits table
//! - [`StateTransitionTimings`]: reported to the stack for scheduling
//! - [`TxPowerConfig`]: power amplifier selection handed to the RF engine
//! - [`SamplingConfig`]: RSSI sampling loop parameters
//! - [`BuildMode`]: standalone radio or shared with a coexistence scheduler
//!
//! The configuration is immutable once handed to [`Radio::new`](crate::Radio::new).

use core::ops::RangeInclusive;

use crate::fsk::DATA_RATE_COUNT;

/// Extra time the RF engine needs between a TX/RX command and the radio
/// being on air, added to every armed timeout
pub const RADIO_WARMUP_US: u32 = 220;

/// FSK channels accepted while operating in [`Region::Na`]
///
/// Spans the whole US 902-928 MHz ISM band. A 916.0 MHz upper bound would
/// reject channels such as 920 MHz that the NA channel plan uses; the
/// engine's channel plan still bounds which channels exist.
pub const NA_FSK_BAND_HZ: RangeInclusive<u32> = 902_200_000..=928_000_000;

code_enum! {
    /// Regulatory region code
    Region, RegionError {
        /// No region selected
        None = 0,
        /// North America
        Na = 1,
        /// Europe
        Eu = 2,
    }
}

/// Per-region radio limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegionalParam {
    /// Region this entry applies to
    pub region: Region,
    /// Max TX power in dBm, indexed by [`DataRate::index`](crate::fsk::DataRate::index)
    pub max_tx_power: [i8; DATA_RATE_COUNT],
    /// CCA threshold adjustment in dB, indexed like `max_tx_power`
    pub cca_level_adjust: [i8; DATA_RATE_COUNT],
    /// Antenna gain in hundredths of a dBi
    pub ant_dbi: i16,
}

impl RegionalParam {
    /// Placeholder entry used until a region is applied
    pub const NONE: Self = Self {
        region: Region::None,
        max_tx_power: [0; DATA_RATE_COUNT],
        cca_level_adjust: [0; DATA_RATE_COUNT],
        ant_dbi: 0,
    };
}

/// North America entry of the stock board table
pub const NA_REGIONAL_PARAM: RegionalParam = RegionalParam {
    region: Region::Na,
    max_tx_power: [20; DATA_RATE_COUNT],
    cca_level_adjust: [0; DATA_RATE_COUNT],
    ant_dbi: 215,
};

/// Europe entry for boards certified there
pub const EU_REGIONAL_PARAM: RegionalParam = RegionalParam {
    region: Region::Eu,
    max_tx_power: [14; DATA_RATE_COUNT],
    cca_level_adjust: [0; DATA_RATE_COUNT],
    ant_dbi: 215,
};

static DEFAULT_REGIONAL_TABLE: [RegionalParam; 1] = [NA_REGIONAL_PARAM];

/// Region selection and the table to look regions up in
#[derive(Debug, Clone, Copy)]
pub struct RegionalConfig<'a> {
    /// Region applied by [`Radio::init`](crate::Radio::init)
    pub region: Region,
    /// Supported regions
    pub params: &'a [RegionalParam],
}

impl RegionalConfig<'_> {
    /// Looks up the table entry for `region`
    pub fn find(&self, region: Region) -> Option<&RegionalParam> {
        self.params.iter().find(|param| param.region == region)
    }
}

impl Default for RegionalConfig<'_> {
    fn default() -> Self {
        Self {
            region: Region::Na,
            params: &DEFAULT_REGIONAL_TABLE,
        }
    }
}

/// Delays the stack accounts for when switching radio states, in µs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StateTransitionTimings {
    pub sleep_to_full_power_us: u32,
    pub full_power_to_sleep_us: u32,
    pub rx_to_tx_us: u32,
    pub tx_to_rx_us: u32,
}

impl Default for StateTransitionTimings {
    fn default() -> Self {
        Self {
            sleep_to_full_power_us: 406,
            full_power_to_sleep_us: 0,
            rx_to_tx_us: 0,
            tx_to_rx_us: 0,
        }
    }
}

/// Power amplifier selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PaMode {
    /// Let the engine pick the sub-GHz PA for the configured band
    #[default]
    SubGhz,
    /// Sub-GHz high power PA
    SubGhzHighPower,
    /// Sub-GHz medium power PA
    SubGhzMediumPower,
    /// Sub-GHz low power PA
    SubGhzLowPower,
}

/// Power amplifier configuration handed to the RF engine before the first
/// power write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TxPowerConfig {
    /// PA to use
    pub mode: PaMode,
    /// PA supply voltage in mV
    pub voltage_mv: u16,
    /// PA ramp time in µs
    pub ramp_time_us: u16,
}

impl Default for TxPowerConfig {
    fn default() -> Self {
        Self {
            mode: PaMode::SubGhz,
            voltage_mv: 3300,
            ramp_time_us: 10,
        }
    }
}

/// RSSI sampling loop parameters
///
/// # Important Notes
/// - Carrier sense takes `ceil(window / channel_free_interval_us)` samples,
///   at least one
/// - Random number generation gives up once more than
///   `random_invalid_budget` samples were unusable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SamplingConfig {
    /// Spacing between carrier sense samples, also the shortest window
    pub channel_free_interval_us: u32,
    /// Samples averaged into a noise reading
    pub noise_samples: u16,
    /// Spacing between noise samples
    pub noise_interval_us: u32,
    /// Samples folded into a random number
    pub random_samples: u8,
    /// Spacing between random number samples
    pub random_interval_us: u32,
    /// Unusable samples tolerated while generating a random number
    pub random_invalid_budget: u8,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            channel_free_interval_us: 1,
            noise_samples: 32,
            noise_interval_us: 30,
            random_samples: 8,
            random_interval_us: 1,
            random_invalid_budget: 10,
        }
    }
}

/// Scheduler settings when the radio is shared with another protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CoexistenceConfig {
    /// Scheduler priority of receive windows, lower wins
    pub rx_priority: u8,
    /// Scheduler priority of transmissions, lower wins
    pub tx_priority: u8,
    /// Time the scheduler needs to hand the radio over, added to timeouts
    pub protocol_switch_time_us: u32,
}

impl Default for CoexistenceConfig {
    fn default() -> Self {
        Self {
            rx_priority: 200,
            tx_priority: 100,
            protocol_switch_time_us: 4000,
        }
    }
}

/// How the radio is shared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BuildMode {
    /// The driver owns the radio
    #[default]
    Standalone,
    /// A coexistence scheduler arbitrates the radio; finished operations
    /// yield it back instead of idling
    Coexistence(CoexistenceConfig),
}

impl BuildMode {
    /// Total delay added to a requested timeout before the timer is armed
    pub fn timeout_margin_us(&self) -> u32 {
        match self {
            Self::Standalone => RADIO_WARMUP_US,
            Self::Coexistence(coex) => RADIO_WARMUP_US.saturating_add(coex.protocol_switch_time_us),
        }
    }

    /// RSSI reads block until a valid sample only when the radio is not shared
    pub fn rssi_wait(&self) -> bool {
        matches!(self, Self::Standalone)
    }
}

/// Complete device configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct DeviceConfig<'a> {
    pub regional: RegionalConfig<'a>,
    pub state_timings: StateTransitionTimings,
    pub tx_power: TxPowerConfig,
    pub sampling: SamplingConfig,
    pub build_mode: BuildMode,
}
