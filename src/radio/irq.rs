//! Engine event dispatcher

use core::mem;

use super::{hw, CadExitMode, Radio, TimerKind, RSSI_INVALID};
use crate::client::{RadioClient, RadioEvent};
use crate::config::BuildMode;
use crate::engine::{EngineEvents, RfEngine, RxPacketStatus};
use crate::error::RadioError;
use crate::fsk::{parse_rx_frame, running_rssi_average, MAX_FRAME_LENGTH, RF_NOISE_FLOOR};

impl<'a, E, C> Radio<'a, E, C>
where
    E: RfEngine,
    C: RadioClient,
{
    /// Handles a mask of engine events
    ///
    /// Meant to run in the engine's callback context. At most one
    /// [`RadioEvent`] is latched per call, chosen in this order: packet
    /// received, preamble detected, receive failure, transmit failure, packet
    /// sent, timer expired. Calibration requests are served alongside any of
    /// them.
    ///
    /// Operations that end here leave the engine idle, or yielded to the
    /// coexistence scheduler after a transmit, without changing
    /// [`state`](Self::state).
    pub fn handle_events(&mut self, events: EngineEvents) {
        trace!("engine events {:x}", events.bits());

        if events.contains(EngineEvents::RX_PACKET_RECEIVED) {
            self.rx_packet.received_at = self.client.uptime();
            let event = match self.process_rx_done() {
                Ok(()) => RadioEvent::RxDone,
                Err(_) => RadioEvent::RxError,
            };
            self.notify(event);
            self.end_rx();
        } else if events.contains(EngineEvents::RX_PREAMBLE_DETECT) {
            self.on_preamble_detected();
        } else if events.intersects(EngineEvents::RX_FAILURES) {
            if events.contains(EngineEvents::RX_FIFO_OVERFLOW) {
                error!("rx fifo overflow");
            }
            if events.contains(EngineEvents::RX_PACKET_ABORTED) {
                error!("rx packet aborted");
            }
            if events.contains(EngineEvents::RX_FRAME_ERROR) {
                error!("rx frame error");
            }
            self.notify(RadioEvent::RxError);
            self.end_rx();
        } else if events.intersects(EngineEvents::TX_FAILURES) {
            error!("tx failed {:x}", (events & EngineEvents::TX_FAILURES).bits());
            self.notify(RadioEvent::TxTimeout);
            self.cancel_timer();
            self.release_engine();
        } else if events.contains(EngineEvents::TX_PACKET_SENT) {
            self.notify(RadioEvent::TxDone);
            self.cancel_timer();
            self.release_engine();
        } else if events.contains(EngineEvents::TIMER_EXPIRED) {
            self.on_timer_expired();
        }

        if events.contains(EngineEvents::CAL_NEEDED) && self.engine.calibrate().is_err() {
            error!("calibration failed");
        }
    }

    /// Delivers the latched event to the client
    ///
    /// Runs on the stack's thread after [`RadioClient::on_irq`] signalled a
    /// latched event. Does nothing when no event is pending.
    pub fn irq_process(&mut self) {
        let event = mem::replace(&mut self.pending_event, RadioEvent::Unknown);
        if event != RadioEvent::Unknown {
            self.client.on_event(event);
        }
    }

    fn end_rx(&mut self) {
        self.cancel_timer();
        self.engine.idle();
    }

    fn on_preamble_detected(&mut self) {
        self.preamble_detected = true;
        if self.cad_exit_mode != CadExitMode::ListenBeforeTalk {
            return;
        }

        let rssi = self.get_rssi();
        if rssi == RSSI_INVALID {
            error!("carrier sense: no rssi at preamble");
        } else {
            self.rx_packet.fsk_status.rssi_sync =
                rssi.clamp(i8::MIN as i16, i8::MAX as i16) as i8;
        }
        self.cad_exit_mode = CadExitMode::None;
        if let BuildMode::Coexistence(_) = self.config.build_mode {
            self.engine.idle();
        }
        self.notify(RadioEvent::CsDone);
    }

    fn on_timer_expired(&mut self) {
        let Some(kind) = self.timer.take() else {
            debug!("timer expired with nothing armed");
            return;
        };

        match kind {
            TimerKind::Tx => {
                self.notify(RadioEvent::TxTimeout);
                self.release_engine();
            }
            TimerKind::Rx if self.preamble_detected => {
                trace!("rx timer ignored, packet in progress");
            }
            TimerKind::Rx if self.cad_exit_mode == CadExitMode::ListenBeforeTalk => {
                self.cad_exit_mode = CadExitMode::None;
                self.notify(RadioEvent::Unknown);
                if self.start_tx(0).is_err() {
                    error!("listen before talk: tx start failed");
                    self.notify(RadioEvent::TxTimeout);
                }
            }
            TimerKind::Rx => {
                self.notify(RadioEvent::RxTimeout);
                self.engine.idle();
            }
        }
    }

    /// Copies the received frame into the stack's buffer and updates the
    /// signal quality
    fn process_rx_done(&mut self) -> Result<(), RadioError> {
        self.rx_packet.payload_len = 0;

        let info = hw(self.engine.rx_packet_info(), "rx packet info")?;
        if !matches!(
            info.status,
            RxPacketStatus::ReadySuccess | RxPacketStatus::ReadyCrcError
        ) {
            error!("rx packet not ready");
            return Err(RadioError::HardwareError);
        }

        let len = info.packet_bytes as usize;
        if len > MAX_FRAME_LENGTH {
            error!("rx packet of {} bytes", len);
            return Err(RadioError::HardwareError);
        }

        let mut raw = [0u8; MAX_FRAME_LENGTH];
        if self.engine.peek_rx_fifo(&mut raw[..len]) != len {
            error!("rx fifo short read");
            return Err(RadioError::HardwareError);
        }

        let frame = match parse_rx_frame(&raw[..len], &mut self.rx_packet.payload) {
            Ok(frame) => frame,
            Err(e) => {
                error!("rx frame rejected: {:?}", e);
                return Err(RadioError::HardwareError);
            }
        };
        self.rx_packet.payload_len = frame.payload_len;

        self.rssi_avg = running_rssi_average(self.rssi_avg, info.rssi);
        let status = &mut self.rx_packet.fsk_status;
        status.rssi_avg = self.rssi_avg;
        status.rx_status = info.rssi.saturating_sub(RF_NOISE_FLOOR);
        status.rssi_sync = info.rssi;
        Ok(())
    }
}
