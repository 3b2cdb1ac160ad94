//! RF engine interface
//!
//! The driver never talks to radio registers. Everything below the packet
//! level is delegated to an [`RfEngine`]: a vendor radio abstraction that owns
//! channel configuration, the TX/RX FIFOs, power control, RSSI measurement and
//! a one-shot hardware timer.
//!
//! The engine reports completions asynchronously as an [`EngineEvents`] mask,
//! which the host forwards to [`Radio::handle_events`](crate::Radio::handle_events).
//! Timer expiry is reported the same way through [`EngineEvents::TIMER_EXPIRED`].

use bitflags::bitflags;

use crate::config::{PaMode, TxPowerConfig};

bitflags! {
    /// Events raised by the RF engine
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct EngineEvents: u32 {
        /// A complete packet is waiting in the RX FIFO
        const RX_PACKET_RECEIVED = 1 << 0;
        /// A preamble was detected on air
        const RX_PREAMBLE_DETECT = 1 << 1;
        /// The RX FIFO overflowed
        const RX_FIFO_OVERFLOW = 1 << 2;
        /// Reception was aborted mid packet
        const RX_PACKET_ABORTED = 1 << 3;
        /// A frame error was detected during reception
        const RX_FRAME_ERROR = 1 << 4;
        /// Transmission was aborted
        const TX_ABORTED = 1 << 5;
        /// Transmission was blocked from starting
        const TX_BLOCKED = 1 << 6;
        /// The TX FIFO ran dry during transmission
        const TX_UNDERFLOW = 1 << 7;
        /// The packet was sent
        const TX_PACKET_SENT = 1 << 8;
        /// The engine needs a calibration pass
        const CAL_NEEDED = 1 << 9;
        /// The timer armed with [`RfEngine::set_timer`] fired
        const TIMER_EXPIRED = 1 << 10;

        /// Receive failures that end the RX operation
        const RX_FAILURES = Self::RX_FIFO_OVERFLOW.bits()
            | Self::RX_PACKET_ABORTED.bits()
            | Self::RX_FRAME_ERROR.bits();
        /// Transmit failures that end the TX operation
        const TX_FAILURES = Self::TX_ABORTED.bits()
            | Self::TX_BLOCKED.bits()
            | Self::TX_UNDERFLOW.bits();
    }
}

impl EngineEvents {
    /// Engine events the driver subscribes to; everything except the timer,
    /// which is always delivered
    pub const fn subscribed() -> Self {
        Self::from_bits_truncate(Self::all().bits() & !Self::TIMER_EXPIRED.bits())
    }
}

bitflags! {
    /// Transmit options
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TxOptions: u8 {
        /// Use the preamble length set with [`RfEngine::set_tx_alt_preamble_length`]
        const ALT_PREAMBLE_LEN = 1 << 0;
    }
}

/// Scheduling hint for engines shared with a coexistence scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SchedulerInfo {
    /// Priority, lower wins
    pub priority: u8,
    /// How long the operation may be delayed, in µs
    pub slip_time_us: u32,
    /// Expected duration, in µs
    pub transaction_time_us: u32,
}

/// Radio configuration matching one of the Sidewalk FSK data rates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RfProfile {
    Fsk50Kbps,
    Fsk150Kbps,
    Fsk250Kbps,
}

impl RfProfile {
    /// Profile running at `bit_rate`
    pub fn from_bit_rate(bit_rate: u32) -> Option<Self> {
        match bit_rate {
            50_000 => Some(Self::Fsk50Kbps),
            150_000 => Some(Self::Fsk150Kbps),
            250_000 => Some(Self::Fsk250Kbps),
            _ => None,
        }
    }

    /// Bit rate of this profile in bits per second
    pub const fn bit_rate(self) -> u32 {
        match self {
            Self::Fsk50Kbps => 50_000,
            Self::Fsk150Kbps => 150_000,
            Self::Fsk250Kbps => 250_000,
        }
    }
}

/// Channel layout of a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelPlan {
    /// Center frequency of channel 0 in Hz
    pub base_frequency_hz: u32,
    /// Distance between channels in Hz
    pub channel_spacing_hz: u32,
    /// Number of channels
    pub channel_count: u16,
}

impl ChannelPlan {
    /// Channel whose center frequency is at or below `frequency_hz`
    ///
    /// Returns `None` when the frequency is below the plan or past its last
    /// channel.
    pub fn channel_for(&self, frequency_hz: u32) -> Option<u16> {
        if self.channel_spacing_hz == 0 {
            return None;
        }
        let offset = frequency_hz.checked_sub(self.base_frequency_hz)?;
        let channel = offset / self.channel_spacing_hz;
        u16::try_from(channel)
            .ok()
            .filter(|channel| *channel < self.channel_count)
    }
}

/// Power range of a PA, in tenths of a dBm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TxPowerCurve {
    pub max_deci_dbm: i16,
    pub min_deci_dbm: i16,
}

/// Completion state of the oldest packet in the RX FIFO
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RxPacketStatus {
    /// No packet available
    None,
    /// Complete and passed the hardware check
    ReadySuccess,
    /// Complete but failed the hardware CRC
    ReadyCrcError,
    /// Reception was aborted
    Aborted,
    /// Still being received
    InProgress,
}

/// Description of the oldest packet in the RX FIFO
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RxPacketInfo {
    pub status: RxPacketStatus,
    /// Packet size in bytes, PHR included
    pub packet_bytes: u16,
    /// RSSI at sync, in dBm
    pub rssi: i8,
}

/// Vendor RF engine driven by the [`Radio`](crate::Radio)
///
/// # Important Notes
/// - Calls are never made concurrently; the driver serializes access
/// - [`idle`](Self::idle) aborts any ongoing operation and must always succeed
/// - RSSI values are reported in quarter dBm
pub trait RfEngine {
    /// Error reported by failing engine calls
    type Error: core::fmt::Debug;

    /// Brings the engine up. Called once from [`Radio::init`](crate::Radio::init).
    fn init(&mut self) -> Result<(), Self::Error>;

    /// One time calibration run after [`init`](Self::init)
    fn calibrate_init(&mut self, profile: RfProfile) -> Result<(), Self::Error>;

    /// Loads the channel configuration of `profile`, subscribes to `events`
    /// and sets up the TX FIFO and sleep configuration
    fn configure(&mut self, profile: RfProfile, events: EngineEvents) -> Result<(), Self::Error>;

    /// Channel layout of `profile`
    fn channel_plan(&self, profile: RfProfile) -> ChannelPlan;

    /// Aborts the current operation and idles the radio
    fn idle(&mut self);

    /// Hands the radio back to the coexistence scheduler
    fn yield_radio(&mut self);

    /// Starts transmitting the TX FIFO on `channel`
    fn start_tx(
        &mut self,
        channel: u16,
        options: TxOptions,
        scheduler: Option<SchedulerInfo>,
    ) -> Result<(), Self::Error>;

    /// Starts receiving on `channel`
    fn start_rx(&mut self, channel: u16, scheduler: Option<SchedulerInfo>) -> Result<(), Self::Error>;

    /// Arms the one-shot timer `delay_us` from now, replacing any armed timer
    fn set_timer(&mut self, delay_us: u32) -> Result<(), Self::Error>;

    /// Disarms the timer
    fn cancel_timer(&mut self);

    /// Runs the calibrations the engine flagged as pending
    fn calibrate(&mut self) -> Result<(), Self::Error>;

    /// Power range of `mode`, `None` when the PA is not available
    fn tx_power_curve(&self, mode: PaMode) -> Option<TxPowerCurve>;

    /// Selects and configures the power amplifier
    fn configure_tx_power(&mut self, config: &TxPowerConfig) -> Result<(), Self::Error>;

    /// Sets the output power in tenths of a dBm
    fn set_tx_power(&mut self, deci_dbm: i16) -> Result<(), Self::Error>;

    /// Instantaneous RSSI in quarter dBm, `None` when no valid sample is
    /// available. With `wait` the engine blocks until one is.
    fn rssi(&mut self, wait: bool) -> Option<i16>;

    /// Loads `data` into the TX FIFO, replacing its contents
    fn write_tx_fifo(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Describes the oldest packet in the RX FIFO
    fn rx_packet_info(&mut self) -> Result<RxPacketInfo, Self::Error>;

    /// Copies up to `buffer.len()` bytes of the oldest packet and returns how
    /// many were copied
    fn peek_rx_fifo(&mut self, buffer: &mut [u8]) -> usize;

    /// Preamble length used by transmits started with
    /// [`TxOptions::ALT_PREAMBLE_LEN`], in bits
    fn set_tx_alt_preamble_length(&mut self, bits: u16) -> Result<(), Self::Error>;
}
