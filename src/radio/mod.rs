//! Radio driver
//!
//! [`Radio`] owns the RF engine, the stack's client and the stack's receive
//! buffer, and holds all driver state. It replaces the process wide context
//! of a C style driver: every operation goes through `&mut self`, so the
//! borrow checker enforces the single writer rule. Hosts that dispatch engine
//! events from an interrupt wrap the `Radio` in a critical section mutex.
//!
//! The implementation is split by concern:
//!
//! - this module: state machine and timer ownership
//! - `ops`: the stack-facing operations (frequency, power, region, sampling)
//! - `fsk`: FSK modulation and packet configuration
//! - `irq`: the engine event dispatcher
//!
//! # States
//! ```text
//! Unknown --> Standby <--> { Sleep, Tx, Rx }
//! ```
//! `Unknown` only exists between construction and [`Radio::init`].

mod fsk;
mod irq;
mod ops;
mod sampling;

use crate::client::{RadioClient, RadioEvent};
use crate::config::{BuildMode, DeviceConfig, RegionalParam};
use crate::engine::{RfEngine, RfProfile, SchedulerInfo, TxOptions};
use crate::error::RadioError;
use crate::fsk::RxPacket;

/// Value returned by [`Radio::get_rssi`] when no valid sample could be taken
pub const RSSI_INVALID: i16 = i16::MAX;

/// Operating state recorded by the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioState {
    Unknown,
    Sleep,
    Standby,
    Tx,
    Rx,
}

/// Modem selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModemMode {
    Fsk,
    Lora,
}

/// What ends a carrier sense window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CadExitMode {
    /// Plain receive window
    None,
    /// Listen before talk: a quiet window is followed by the queued transmit
    ListenBeforeTalk,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum TimerKind {
    Tx,
    Rx,
}

/// FSK radio driver for a Sidewalk stack
pub struct Radio<'a, E, C> {
    engine: E,
    client: C,
    config: DeviceConfig<'a>,
    rx_packet: &'a mut RxPacket,

    state: RadioState,
    pending_event: RadioEvent,
    cad_exit_mode: CadExitMode,
    timer: Option<TimerKind>,
    preamble_detected: bool,

    engine_ready: bool,
    rf_profile: Option<RfProfile>,
    regional: RegionalParam,
    frequency_hz: u32,
    channel: u16,
    last_rx_channel: Option<u16>,

    pa_configured: bool,
    tx_power: Option<i8>,
    rssi_avg: i8,
}

impl<'a, E, C> Radio<'a, E, C> {
    /// Creates a driver in the [`RadioState::Unknown`] state
    ///
    /// Nothing is sent to the engine until [`Radio::init`].
    ///
    /// # Arguments
    /// * `engine` - RF engine to drive
    /// * `client` - the stack's callbacks
    /// * `config` - board configuration
    /// * `rx_packet` - buffer the driver fills with received packets
    pub fn new(engine: E, client: C, config: DeviceConfig<'a>, rx_packet: &'a mut RxPacket) -> Self {
        Self {
            engine,
            client,
            config,
            rx_packet,
            state: RadioState::Unknown,
            pending_event: RadioEvent::Unknown,
            cad_exit_mode: CadExitMode::None,
            timer: None,
            preamble_detected: false,
            engine_ready: false,
            rf_profile: None,
            regional: RegionalParam::NONE,
            frequency_hz: 0,
            channel: 0,
            last_rx_channel: None,
            pa_configured: false,
            tx_power: None,
            rssi_avg: 0,
        }
    }

    /// Releases the engine and the client
    pub fn release(self) -> (E, C) {
        (self.engine, self.client)
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut C {
        &mut self.client
    }

    pub fn config(&self) -> &DeviceConfig<'a> {
        &self.config
    }

    /// The receive buffer as last filled by the dispatcher
    pub fn rx_packet(&self) -> &RxPacket {
        &*self.rx_packet
    }

    /// Last state commanded through the driver
    ///
    /// # Important Notes
    /// - The dispatcher idles the engine when an operation ends but does not
    ///   change the recorded state; the stack moves the driver back to
    ///   standby or sleep explicitly
    pub fn state(&self) -> RadioState {
        self.state
    }

    pub fn cad_exit_mode(&self) -> CadExitMode {
        self.cad_exit_mode
    }

    /// Event latched by the dispatcher and not yet processed
    pub fn pending_event(&self) -> RadioEvent {
        self.pending_event
    }

    /// Whether a preamble was seen since the last receive started
    pub fn preamble_detected(&self) -> bool {
        self.preamble_detected
    }

    /// Whether a TX or RX timeout timer is armed
    pub fn timer_armed(&self) -> bool {
        self.timer.is_some()
    }
}

impl<'a, E, C> Radio<'a, E, C>
where
    E: RfEngine,
    C: RadioClient,
{
    /// Moves to [`RadioState::Standby`]
    ///
    /// Cancels any armed timer and idles the engine, or yields it in a
    /// coexistence build. Does nothing when already in standby.
    pub fn standby(&mut self) -> Result<(), RadioError> {
        self.enter_inactive(RadioState::Standby);
        Ok(())
    }

    /// Moves to [`RadioState::Sleep`]
    ///
    /// The transceiver has no deeper low power state than idle, so this
    /// behaves like [`standby`](Self::standby) and only records a different
    /// state.
    pub fn sleep(&mut self) -> Result<(), RadioError> {
        self.enter_inactive(RadioState::Sleep);
        Ok(())
    }

    /// Transmits the TX FIFO on the current channel
    ///
    /// # Arguments
    /// * `timeout_us` - raise a TX timeout if the engine reports nothing
    ///   within this time; `0` disables the timer
    ///
    /// # Errors
    /// * `RadioError::HardwareError` - the engine refused the transmit or
    ///   the timer
    pub fn start_tx(&mut self, timeout_us: u32) -> Result<(), RadioError> {
        self.cancel_timer();

        let scheduler = self.scheduler_info(TimerKind::Tx);
        hw(
            self.engine
                .start_tx(self.channel, TxOptions::ALT_PREAMBLE_LEN, scheduler),
            "start tx",
        )?;
        self.state = RadioState::Tx;

        if timeout_us > 0 {
            self.arm_timer(TimerKind::Tx, timeout_us)?;
        }
        Ok(())
    }

    /// Receives on the current channel
    ///
    /// When the channel changed since the previous receive the engine is
    /// idled first so it retunes.
    ///
    /// # Arguments
    /// * `timeout_us` - raise an RX timeout if no preamble arrives within
    ///   this time; `0` receives until stopped
    ///
    /// # Errors
    /// * `RadioError::HardwareError` - the engine refused the receive or
    ///   the timer
    pub fn start_rx(&mut self, timeout_us: u32) -> Result<(), RadioError> {
        self.preamble_detected = false;
        self.cancel_timer();
        if self.last_rx_channel != Some(self.channel) {
            self.engine.idle();
        }

        let scheduler = self.scheduler_info(TimerKind::Rx);
        hw(self.engine.start_rx(self.channel, scheduler), "start rx")?;
        self.last_rx_channel = Some(self.channel);
        self.state = RadioState::Rx;

        if timeout_us > 0 {
            self.arm_timer(TimerKind::Rx, timeout_us)?;
        }
        Ok(())
    }

    fn enter_inactive(&mut self, state: RadioState) {
        if self.state == state {
            return;
        }
        self.cancel_timer();
        self.release_engine();
        self.state = state;
    }

    fn arm_timer(&mut self, kind: TimerKind, timeout_us: u32) -> Result<(), RadioError> {
        let delay_us = timeout_us.saturating_add(self.config.build_mode.timeout_margin_us());
        hw(self.engine.set_timer(delay_us), "set timer")?;
        self.timer = Some(kind);
        Ok(())
    }

    fn cancel_timer(&mut self) {
        if self.timer.take().is_some() {
            self.engine.cancel_timer();
        }
    }

    /// Ends the engine's current operation: yields to the coexistence
    /// scheduler when shared, idles otherwise
    fn release_engine(&mut self) {
        match self.config.build_mode {
            BuildMode::Standalone => self.engine.idle(),
            BuildMode::Coexistence(_) => self.engine.yield_radio(),
        }
    }

    fn scheduler_info(&self, kind: TimerKind) -> Option<SchedulerInfo> {
        match self.config.build_mode {
            BuildMode::Standalone => None,
            BuildMode::Coexistence(coex) => Some(SchedulerInfo {
                priority: match kind {
                    TimerKind::Tx => coex.tx_priority,
                    TimerKind::Rx => coex.rx_priority,
                },
                slip_time_us: 0,
                transaction_time_us: 0,
            }),
        }
    }

    /// Latches `event` for [`irq_process`](Self::irq_process) and wakes the stack
    fn notify(&mut self, event: RadioEvent) {
        self.pending_event = event;
        self.client.on_irq();
    }
}

/// Maps an engine failure to [`RadioError::HardwareError`], logging it
fn hw<T, X: core::fmt::Debug>(result: Result<T, X>, operation: &str) -> Result<T, RadioError> {
    result.map_err(|e| {
        #[cfg(feature = "defmt")]
        error!("rf engine: {} failed: {:?}", operation, defmt::Debug2Format(&e));
        #[cfg(not(feature = "defmt"))]
        error!("rf engine: {} failed: {:?}", operation, e);
        RadioError::HardwareError
    })
}
