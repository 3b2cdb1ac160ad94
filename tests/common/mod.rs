#![allow(dead_code)]

use std::collections::VecDeque;
use std::time::Duration;

use efr32_sidewalk_radio::config::{PaMode, TxPowerConfig};
use efr32_sidewalk_radio::engine::{
    ChannelPlan, EngineEvents, RfProfile, RxPacketInfo, RxPacketStatus, SchedulerInfo,
    TxOptions, TxPowerCurve,
};
use efr32_sidewalk_radio::{RadioClient, RadioEvent, RfEngine};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Commands received by the simulated engine, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Init,
    CalibrateInit(RfProfile),
    Configure(RfProfile, EngineEvents),
    Idle,
    Yield,
    StartTx {
        channel: u16,
        options: TxOptions,
        scheduler: Option<SchedulerInfo>,
    },
    StartRx {
        channel: u16,
        scheduler: Option<SchedulerInfo>,
    },
    SetTimer(u32),
    CancelTimer,
    Calibrate,
    ConfigureTxPower(PaMode),
    SetTxPower(i16),
    SetAltPreamble(u16),
}

#[derive(Debug)]
pub struct SimError;

/// RF engine double that records every command and replays scripted
/// measurements
pub struct SimEngine {
    pub calls: Vec<Call>,
    /// Returned once each before falling back to `rssi_dbm`
    pub rssi_script: VecDeque<Option<i16>>,
    /// Steady RSSI in dBm, `None` for an invalid sample
    pub rssi_dbm: Option<i16>,
    pub rx_info: RxPacketInfo,
    pub rx_fifo: Vec<u8>,
    pub tx_fifo: Vec<u8>,
    pub fail_start_tx: bool,
    pub fail_calibrate: bool,
}

pub const PLAN: ChannelPlan = ChannelPlan {
    base_frequency_hz: 902_200_000,
    channel_spacing_hz: 200_000,
    channel_count: 130,
};

impl Default for SimEngine {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            rssi_script: VecDeque::new(),
            rssi_dbm: Some(-100),
            rx_info: RxPacketInfo {
                status: RxPacketStatus::None,
                packet_bytes: 0,
                rssi: 0,
            },
            rx_fifo: Vec::new(),
            tx_fifo: Vec::new(),
            fail_start_tx: false,
            fail_calibrate: false,
        }
    }
}

impl SimEngine {
    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|call| predicate(call)).count()
    }

    pub fn idles(&self) -> usize {
        self.count(|call| *call == Call::Idle)
    }

    pub fn start_txs(&self) -> usize {
        self.count(|call| matches!(call, Call::StartTx { .. }))
    }

    pub fn timers(&self) -> Vec<u32> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::SetTimer(delay) => Some(*delay),
                _ => None,
            })
            .collect()
    }

    /// Loads a frame as it would sit in the RX FIFO
    pub fn receive(&mut self, frame: &[u8], rssi: i8) {
        self.rx_fifo = frame.to_vec();
        self.rx_info = RxPacketInfo {
            status: RxPacketStatus::ReadySuccess,
            packet_bytes: frame.len() as u16,
            rssi,
        };
    }
}

impl RfEngine for SimEngine {
    type Error = SimError;

    fn init(&mut self) -> Result<(), SimError> {
        self.calls.push(Call::Init);
        Ok(())
    }

    fn calibrate_init(&mut self, profile: RfProfile) -> Result<(), SimError> {
        self.calls.push(Call::CalibrateInit(profile));
        Ok(())
    }

    fn configure(&mut self, profile: RfProfile, events: EngineEvents) -> Result<(), SimError> {
        self.calls.push(Call::Configure(profile, events));
        Ok(())
    }

    fn channel_plan(&self, _profile: RfProfile) -> ChannelPlan {
        PLAN
    }

    fn idle(&mut self) {
        self.calls.push(Call::Idle);
    }

    fn yield_radio(&mut self) {
        self.calls.push(Call::Yield);
    }

    fn start_tx(
        &mut self,
        channel: u16,
        options: TxOptions,
        scheduler: Option<SchedulerInfo>,
    ) -> Result<(), SimError> {
        self.calls.push(Call::StartTx {
            channel,
            options,
            scheduler,
        });
        if self.fail_start_tx {
            Err(SimError)
        } else {
            Ok(())
        }
    }

    fn start_rx(&mut self, channel: u16, scheduler: Option<SchedulerInfo>) -> Result<(), SimError> {
        self.calls.push(Call::StartRx { channel, scheduler });
        Ok(())
    }

    fn set_timer(&mut self, delay_us: u32) -> Result<(), SimError> {
        self.calls.push(Call::SetTimer(delay_us));
        Ok(())
    }

    fn cancel_timer(&mut self) {
        self.calls.push(Call::CancelTimer);
    }

    fn calibrate(&mut self) -> Result<(), SimError> {
        self.calls.push(Call::Calibrate);
        if self.fail_calibrate {
            Err(SimError)
        } else {
            Ok(())
        }
    }

    fn tx_power_curve(&self, _mode: PaMode) -> Option<TxPowerCurve> {
        Some(TxPowerCurve {
            max_deci_dbm: 200,
            min_deci_dbm: -100,
        })
    }

    fn configure_tx_power(&mut self, config: &TxPowerConfig) -> Result<(), SimError> {
        self.calls.push(Call::ConfigureTxPower(config.mode));
        Ok(())
    }

    fn set_tx_power(&mut self, deci_dbm: i16) -> Result<(), SimError> {
        self.calls.push(Call::SetTxPower(deci_dbm));
        Ok(())
    }

    fn rssi(&mut self, _wait: bool) -> Option<i16> {
        let dbm = self.rssi_script.pop_front().unwrap_or(self.rssi_dbm);
        dbm.map(|dbm| dbm * 4)
    }

    fn write_tx_fifo(&mut self, data: &[u8]) -> Result<(), SimError> {
        self.tx_fifo = data.to_vec();
        Ok(())
    }

    fn rx_packet_info(&mut self) -> Result<RxPacketInfo, SimError> {
        Ok(self.rx_info)
    }

    fn peek_rx_fifo(&mut self, buffer: &mut [u8]) -> usize {
        let len = buffer.len().min(self.rx_fifo.len());
        buffer[..len].copy_from_slice(&self.rx_fifo[..len]);
        len
    }

    fn set_tx_alt_preamble_length(&mut self, bits: u16) -> Result<(), SimError> {
        self.calls.push(Call::SetAltPreamble(bits));
        Ok(())
    }
}

/// Stack double recording notifications
#[derive(Default)]
pub struct RecordingClient {
    pub events: Vec<RadioEvent>,
    pub irqs: usize,
    pub uptime: Option<Duration>,
}

impl RadioClient for RecordingClient {
    fn on_event(&mut self, event: RadioEvent) {
        self.events.push(event);
    }

    fn on_irq(&mut self) {
        self.irqs += 1;
    }

    fn uptime(&mut self) -> Option<Duration> {
        self.uptime
    }
}

/// Delay that returns immediately and counts the time requested
#[derive(Default)]
pub struct CountingDelay {
    pub total_ns: u64,
}

impl embedded_hal::delay::DelayNs for CountingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += ns as u64;
    }
}

impl embedded_hal_async::delay::DelayNs for CountingDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.total_ns += ns as u64;
    }
}
