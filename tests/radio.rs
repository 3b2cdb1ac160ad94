mod common;

use std::time::Duration;

use common::{Call, CountingDelay, RecordingClient, SimEngine};
use efr32_sidewalk_radio::config::{
    CoexistenceConfig, PaMode, RegionalConfig, RegionalParam, SamplingConfig, EU_REGIONAL_PARAM,
    NA_REGIONAL_PARAM,
};
use efr32_sidewalk_radio::engine::{RfProfile, RxPacketStatus, SchedulerInfo, TxOptions};
use efr32_sidewalk_radio::fsk::{
    prepare_for_tx, Bandwidth, DataRate, FcsType, FskModulationParams, FskPacketParams,
    FskPhyHeader, RxPacket, Shaping,
};
use efr32_sidewalk_radio::phy::encode_phr;
use efr32_sidewalk_radio::{
    BuildMode, CadExitMode, DeviceConfig, EngineEvents, ModemMode, Radio, RadioError, RadioEvent,
    RadioState, Region, RSSI_INVALID,
};

type SimRadio<'a> = Radio<'a, SimEngine, RecordingClient>;

static NA_EU_TABLE: [RegionalParam; 2] = [NA_REGIONAL_PARAM, EU_REGIONAL_PARAM];

fn ready_with<'a>(rx: &'a mut RxPacket, config: DeviceConfig<'a>) -> SimRadio<'a> {
    common::init_logger();
    let mut radio = Radio::new(SimEngine::default(), RecordingClient::default(), config, rx);
    radio.init().unwrap();
    radio.set_frequency(915_000_000).unwrap();
    radio.engine_mut().calls.clear();
    radio
}

fn ready(rx: &mut RxPacket) -> SimRadio<'_> {
    ready_with(rx, DeviceConfig::default())
}

fn coexistence() -> DeviceConfig<'static> {
    DeviceConfig {
        build_mode: BuildMode::Coexistence(CoexistenceConfig::default()),
        ..Default::default()
    }
}

fn modulation(bit_rate: u32) -> FskModulationParams {
    FskModulationParams {
        bit_rate,
        freq_dev: 25_000,
        bandwidth: Bandwidth::Bw156200,
        shaping: Shaping::Bt1,
    }
}

/// Builds a frame with the TX preparation path and returns it as the engine
/// would hold it in its FIFO
fn on_air_frame(radio: &mut SimRadio<'_>, payload: &[u8], fcs_type: FcsType) -> Vec<u8> {
    let mut buffer = [0u8; 255];
    buffer[..payload.len()].copy_from_slice(payload);
    let mut params = FskPacketParams {
        preamble_length: 8,
        payload_length: payload.len() as u8,
        ..Default::default()
    };
    let header = FskPhyHeader {
        fcs_type,
        is_data_whitening_enabled: false,
        is_fec_enabled: false,
    };
    prepare_for_tx(&header, &mut params, &mut buffer).unwrap();

    radio
        .set_tx_payload(&buffer[..params.payload_length as usize])
        .unwrap();
    radio.engine().tx_fifo.clone()
}

#[test]
fn test_init_sequence() {
    common::init_logger();
    let mut rx = RxPacket::new();
    let mut radio = Radio::new(
        SimEngine::default(),
        RecordingClient::default(),
        DeviceConfig::default(),
        &mut rx,
    );
    assert_eq!(radio.state(), RadioState::Unknown);

    radio.init().unwrap();

    assert_eq!(
        radio.engine().calls,
        vec![
            Call::Init,
            Call::CalibrateInit(RfProfile::Fsk50Kbps),
            Call::Configure(RfProfile::Fsk50Kbps, EngineEvents::subscribed()),
            Call::Idle,
            Call::ConfigureTxPower(PaMode::SubGhz),
            Call::SetTxPower(200),
        ]
    );
    assert_eq!(radio.state(), RadioState::Standby);
    assert_eq!(radio.region(), Region::Na);
    assert_eq!(radio.tx_power(), 20);
    assert_eq!(radio.antenna_gain(), 215);
    assert_eq!(radio.state_transition_timings().sleep_to_full_power_us, 406);
}

#[test]
fn test_init_twice_brings_engine_up_once() {
    let mut rx = RxPacket::new();
    let mut radio = ready(&mut rx);

    radio.init().unwrap();

    assert_eq!(radio.engine().count(|call| *call == Call::Init), 0);
    assert_eq!(radio.state(), RadioState::Standby);
}

#[test]
fn test_init_with_unknown_region_fails() {
    common::init_logger();
    let mut rx = RxPacket::new();
    let config = DeviceConfig {
        regional: RegionalConfig {
            region: Region::Eu,
            ..Default::default()
        },
        ..Default::default()
    };
    let mut radio = Radio::new(SimEngine::default(), RecordingClient::default(), config, &mut rx);

    assert_eq!(radio.init(), Err(RadioError::HardwareError));
    assert!(radio.engine().calls.is_empty());
}

#[test]
fn test_na_frequency_band() {
    let mut rx = RxPacket::new();
    let mut radio = ready(&mut rx);

    radio.set_region(Region::Na).unwrap();
    radio.set_frequency(920_000_000).unwrap();
    assert_eq!(radio.frequency(), 920_000_000);
    assert_eq!(radio.channel(), 89);

    assert_eq!(
        radio.set_frequency(800_000_000),
        Err(RadioError::InvalidParams)
    );
    assert_eq!(radio.frequency(), 920_000_000);
    assert_eq!(
        radio.set_frequency(930_000_000),
        Err(RadioError::InvalidParams)
    );
}

#[test]
fn test_frequency_outside_channel_plan() {
    let mut rx = RxPacket::new();
    let config = DeviceConfig {
        regional: RegionalConfig {
            region: Region::Eu,
            params: &NA_EU_TABLE,
        },
        ..Default::default()
    };
    let mut radio = ready_with(&mut rx, config);

    assert_eq!(
        radio.set_frequency(868_000_000),
        Err(RadioError::InvalidParams)
    );
}

#[test]
fn test_set_region() {
    let mut rx = RxPacket::new();
    let mut radio = ready(&mut rx);

    assert_eq!(radio.set_region(Region::None), Err(RadioError::InvalidParams));
    assert_eq!(radio.set_region(Region::Eu), Err(RadioError::NotSupported));
    assert_eq!(radio.region(), Region::Na);
}

#[test]
fn test_regional_power_limit() {
    let mut rx = RxPacket::new();
    let config = DeviceConfig {
        regional: RegionalConfig {
            region: Region::Eu,
            params: &NA_EU_TABLE,
        },
        ..Default::default()
    };
    let mut radio = ready_with(&mut rx, config);

    assert_eq!(radio.tx_power(), 14);
    assert_eq!(radio.max_tx_power(DataRate::Kbps50), Ok(14));
    assert_eq!(
        radio.max_tx_power(DataRate::Kbps2),
        Err(RadioError::InvalidParams)
    );

    radio.set_region(Region::Na).unwrap();
    radio.set_tx_power(20).unwrap();
    assert_eq!(radio.engine().calls, vec![Call::SetTxPower(200)]);
}

#[test]
fn test_tx_power_clamp_and_cache() {
    let mut rx = RxPacket::new();
    let mut radio = ready(&mut rx);

    assert_eq!(radio.tx_power_range(), Ok((20, -10)));

    radio.set_tx_power(30).unwrap();
    assert!(radio.engine().calls.is_empty());

    radio.set_tx_power(-20).unwrap();
    assert_eq!(radio.tx_power(), -10);
    radio.set_tx_power(-10).unwrap();
    radio.set_tx_power(5).unwrap();

    assert_eq!(
        radio.engine().calls,
        vec![Call::SetTxPower(-100), Call::SetTxPower(50)]
    );
}

#[test]
fn test_standby_is_idempotent() {
    let mut rx = RxPacket::new();
    let mut radio = ready(&mut rx);

    radio.standby().unwrap();
    radio.standby().unwrap();
    assert!(radio.engine().calls.is_empty());

    radio.start_rx(1000).unwrap();
    radio.engine_mut().calls.clear();
    radio.standby().unwrap();
    radio.standby().unwrap();

    assert_eq!(radio.engine().calls, vec![Call::CancelTimer, Call::Idle]);
    assert_eq!(radio.state(), RadioState::Standby);
    assert!(!radio.timer_armed());
}

#[test]
fn test_sleep_then_standby() {
    let mut rx = RxPacket::new();
    let mut radio = ready(&mut rx);

    radio.sleep().unwrap();
    assert_eq!(radio.state(), RadioState::Sleep);
    radio.standby().unwrap();
    assert_eq!(radio.state(), RadioState::Standby);
    assert_eq!(radio.engine().idles(), 2);
}

#[test]
fn test_start_tx_timeout_arming() {
    let mut rx = RxPacket::new();
    let mut radio = ready(&mut rx);

    radio.start_tx(1000).unwrap();
    assert_eq!(radio.engine().timers(), vec![1220]);
    assert_eq!(
        radio.engine().calls[0],
        Call::StartTx {
            channel: 64,
            options: TxOptions::ALT_PREAMBLE_LEN,
            scheduler: None,
        }
    );
    assert_eq!(radio.state(), RadioState::Tx);
    assert!(radio.timer_armed());

    radio.engine_mut().calls.clear();
    radio.start_tx(0).unwrap();
    assert!(radio.engine().timers().is_empty());
    assert_eq!(radio.engine().count(|call| *call == Call::CancelTimer), 1);
    assert!(!radio.timer_armed());
}

#[test]
fn test_start_rx_idles_on_channel_change() {
    let mut rx = RxPacket::new();
    let mut radio = ready(&mut rx);

    radio.start_rx(0).unwrap();
    assert_eq!(
        radio.engine().calls,
        vec![
            Call::Idle,
            Call::StartRx {
                channel: 64,
                scheduler: None
            }
        ]
    );
    assert!(!radio.timer_armed());

    radio.engine_mut().calls.clear();
    radio.start_rx(500).unwrap();
    assert_eq!(radio.engine().idles(), 0);

    radio.engine_mut().calls.clear();
    radio.set_frequency(916_000_000).unwrap();
    radio.start_rx(1000).unwrap();
    assert_eq!(
        radio.engine().calls,
        vec![
            Call::CancelTimer,
            Call::Idle,
            Call::StartRx {
                channel: 69,
                scheduler: None
            },
            Call::SetTimer(1220),
        ]
    );
    assert_eq!(radio.state(), RadioState::Rx);
}

#[test]
fn test_channel_busy_returns_to_standby() {
    let mut rx = RxPacket::new();
    let mut radio = ready(&mut rx);
    radio.engine_mut().rssi_dbm = Some(-60);
    let mut delay = CountingDelay::default();

    let free = radio.is_channel_free(&mut delay, 915_000_000, -80, 50);

    assert_eq!(free, Ok(false));
    assert_eq!(radio.state(), RadioState::Standby);
    assert_eq!(delay.total_ns, 1000);
}

#[test]
fn test_quiet_channel_is_sampled_for_the_whole_window() {
    let mut rx = RxPacket::new();
    let mut radio = ready(&mut rx);
    let mut delay = CountingDelay::default();

    let free = radio.is_channel_free(&mut delay, 915_000_000, -80, 50);

    assert_eq!(free, Ok(true));
    assert_eq!(delay.total_ns, 50_000);
    assert_eq!(radio.state(), RadioState::Standby);
}

#[test]
fn test_channel_free_fails_on_invalid_rssi() {
    let mut rx = RxPacket::new();
    let mut radio = ready(&mut rx);
    radio.engine_mut().rssi_script.extend([Some(-100), None]);
    let mut delay = CountingDelay::default();

    let free = radio.is_channel_free(&mut delay, 915_000_000, -80, 50);

    assert_eq!(free, Err(RadioError::HardwareError));
    assert_eq!(radio.state(), RadioState::Standby);
}

#[test]
fn test_channel_free_with_bad_frequency_stays_in_standby() {
    let mut rx = RxPacket::new();
    let mut radio = ready(&mut rx);
    let mut delay = CountingDelay::default();

    let free = radio.is_channel_free(&mut delay, 800_000_000, -80, 50);

    assert_eq!(free, Err(RadioError::HardwareError));
    assert_eq!(radio.state(), RadioState::Standby);
    assert_eq!(radio.engine().count(|call| matches!(call, Call::StartRx { .. })), 0);
}

#[test]
fn test_channel_noise() {
    let mut rx = RxPacket::new();
    let config = DeviceConfig {
        sampling: SamplingConfig {
            noise_samples: 4,
            ..Default::default()
        },
        ..Default::default()
    };
    let mut radio = ready_with(&mut rx, config);
    radio
        .engine_mut()
        .rssi_script
        .extend([Some(-100), Some(-90), Some(-95), Some(-95)]);
    let mut delay = CountingDelay::default();

    assert_eq!(radio.get_channel_noise(&mut delay, 915_000_000), Ok(-95));
    assert_eq!(radio.state(), RadioState::Standby);
    assert_eq!(delay.total_ns, 4 * 30_000);
}

#[test]
fn test_channel_noise_fails_on_invalid_sample() {
    let mut rx = RxPacket::new();
    let mut radio = ready(&mut rx);
    radio.engine_mut().rssi_script.extend([Some(-100), None]);
    let mut delay = CountingDelay::default();

    assert_eq!(
        radio.get_channel_noise(&mut delay, 915_000_000),
        Err(RadioError::HardwareError)
    );
    assert_eq!(radio.state(), RadioState::Standby);
}

#[test]
fn test_random() {
    let mut rx = RxPacket::new();
    let config = DeviceConfig {
        sampling: SamplingConfig {
            random_samples: 2,
            ..Default::default()
        },
        ..Default::default()
    };
    let mut radio = ready_with(&mut rx, config);
    radio
        .engine_mut()
        .rssi_script
        .extend([Some(0), Some(-90), None, Some(-75)]);
    let mut delay = CountingDelay::default();

    assert_eq!(radio.get_random(&mut delay), Ok(0x0500_0AFF));
    assert_eq!(radio.state(), RadioState::Standby);
}

#[test]
fn test_random_gives_up_without_signal() {
    let mut rx = RxPacket::new();
    let mut radio = ready(&mut rx);
    radio.engine_mut().rssi_dbm = None;
    let mut delay = CountingDelay::default();

    assert_eq!(radio.get_random(&mut delay), Err(RadioError::HardwareError));
    assert_eq!(radio.state(), RadioState::Standby);
}

#[tokio::test]
async fn test_async_sampling() {
    let mut rx = RxPacket::new();
    let mut radio = ready(&mut rx);
    radio.engine_mut().rssi_dbm = Some(-60);
    let mut delay = CountingDelay::default();

    assert_eq!(
        radio
            .is_channel_free_async(&mut delay, 915_000_000, -80, 50)
            .await,
        Ok(false)
    );
    assert_eq!(
        radio.get_channel_noise_async(&mut delay, 915_000_000).await,
        Ok(-60)
    );
    assert!(radio.get_random_async(&mut delay).await.is_ok());
    assert_eq!(radio.state(), RadioState::Standby);
}

#[test]
fn test_get_rssi() {
    let mut rx = RxPacket::new();
    let mut radio = ready(&mut rx);

    radio.engine_mut().rssi_dbm = Some(-87);
    assert_eq!(radio.get_rssi(), -87);

    radio.engine_mut().rssi_dbm = None;
    assert_eq!(radio.get_rssi(), RSSI_INVALID);
}

#[test]
fn test_set_tx_payload_reverses_psdu() {
    let mut rx = RxPacket::new();
    let mut radio = ready(&mut rx);

    radio.set_tx_payload(&[0x08, 0x30, 0x01, 0x80, 0xF0]).unwrap();
    assert_eq!(radio.engine().tx_fifo, vec![0x08, 0x30, 0x80, 0x01, 0x0F]);

    assert_eq!(radio.set_tx_payload(&[]), Err(RadioError::InvalidParams));
    assert_eq!(
        radio.set_tx_payload(&[0; 256]),
        Err(RadioError::InvalidParams)
    );
}

#[test]
fn test_rx_done() {
    let mut rx = RxPacket::new();
    let mut radio = ready(&mut rx);
    radio.client_mut().uptime = Some(Duration::from_millis(1234));
    let payload = *b"sidewalk frame";
    let frame = on_air_frame(&mut radio, &payload, FcsType::Crc32);

    radio.engine_mut().receive(&frame, -60);
    radio.start_rx(0).unwrap();
    radio.engine_mut().calls.clear();
    radio.handle_events(EngineEvents::RX_PACKET_RECEIVED);

    assert_eq!(radio.pending_event(), RadioEvent::RxDone);
    assert_eq!(radio.client().irqs, 1);
    assert_eq!(radio.engine().calls, vec![Call::Idle]);

    radio.irq_process();
    assert_eq!(radio.client().events, vec![RadioEvent::RxDone]);
    assert_eq!(radio.pending_event(), RadioEvent::Unknown);

    let packet = radio.rx_packet();
    assert_eq!(packet.payload(), &payload);
    assert_eq!(packet.received_at, Some(Duration::from_millis(1234)));
    assert_eq!(packet.fsk_status.rssi_sync, -60);
    assert_eq!(packet.fsk_status.rssi_avg, -60);
    assert_eq!(packet.fsk_status.rx_status, 30);
}

#[test]
fn test_rssi_average_over_packets() {
    let mut rx = RxPacket::new();
    let mut radio = ready(&mut rx);
    let frame = on_air_frame(&mut radio, &[1, 2, 3], FcsType::Crc16);

    radio.engine_mut().receive(&frame, -60);
    radio.handle_events(EngineEvents::RX_PACKET_RECEIVED);
    radio.engine_mut().receive(&frame, -80);
    radio.handle_events(EngineEvents::RX_PACKET_RECEIVED);

    let status = radio.rx_packet().fsk_status;
    assert_eq!(status.rssi_avg, -70);
    assert_eq!(status.rssi_sync, -80);
    assert_eq!(radio.rx_packet().payload(), &[1, 2, 3]);
}

#[test]
fn test_rx_unknown_fcs_is_an_error() {
    let mut rx = RxPacket::new();
    let mut radio = ready(&mut rx);
    let mut frame = encode_phr(true, false, false, 6).unwrap().to_vec();
    frame.extend_from_slice(&[0xAA; 6]);

    radio.engine_mut().receive(&frame, -60);
    radio.handle_events(EngineEvents::RX_PACKET_RECEIVED);
    radio.irq_process();

    assert_eq!(radio.client().events, vec![RadioEvent::RxError]);
    assert_eq!(radio.rx_packet().payload_len, 0);
}

#[test]
fn test_rx_packet_not_ready_is_an_error() {
    let mut rx = RxPacket::new();
    let mut radio = ready(&mut rx);
    let frame = on_air_frame(&mut radio, &[1, 2, 3, 4, 5], FcsType::Crc16);
    radio.engine_mut().receive(&frame, -60);
    radio.handle_events(EngineEvents::RX_PACKET_RECEIVED);
    assert_eq!(radio.rx_packet().payload_len, 5);

    radio.engine_mut().rx_info.status = RxPacketStatus::Aborted;
    radio.handle_events(EngineEvents::RX_PACKET_RECEIVED);

    assert_eq!(radio.pending_event(), RadioEvent::RxError);
    assert_eq!(radio.rx_packet().payload_len, 0);
}

#[test]
fn test_rx_short_fifo_read_clears_payload() {
    let mut rx = RxPacket::new();
    let mut radio = ready(&mut rx);
    let frame = on_air_frame(&mut radio, &[1, 2, 3, 4, 5], FcsType::Crc16);
    radio.engine_mut().receive(&frame, -60);
    radio.handle_events(EngineEvents::RX_PACKET_RECEIVED);

    radio.engine_mut().rx_info.packet_bytes = frame.len() as u16 + 1;
    radio.handle_events(EngineEvents::RX_PACKET_RECEIVED);

    assert_eq!(radio.pending_event(), RadioEvent::RxError);
    assert_eq!(radio.rx_packet().payload_len, 0);
}

#[test]
fn test_rx_failures() {
    let mut rx = RxPacket::new();
    let mut radio = ready(&mut rx);
    radio.start_rx(1000).unwrap();
    radio.engine_mut().calls.clear();

    radio.handle_events(EngineEvents::RX_FIFO_OVERFLOW | EngineEvents::RX_FRAME_ERROR);

    assert_eq!(radio.pending_event(), RadioEvent::RxError);
    assert_eq!(radio.engine().calls, vec![Call::CancelTimer, Call::Idle]);
    assert!(!radio.timer_armed());
}

#[test]
fn test_rx_timeout() {
    let mut rx = RxPacket::new();
    let mut radio = ready(&mut rx);
    radio.start_rx(1000).unwrap();
    radio.engine_mut().calls.clear();

    radio.handle_events(EngineEvents::TIMER_EXPIRED);

    assert_eq!(radio.pending_event(), RadioEvent::RxTimeout);
    assert_eq!(radio.engine().calls, vec![Call::Idle]);
    assert!(!radio.timer_armed());
}

#[test]
fn test_rx_timer_ignored_after_preamble() {
    let mut rx = RxPacket::new();
    let mut radio = ready(&mut rx);
    radio.start_rx(1000).unwrap();
    radio.handle_events(EngineEvents::RX_PREAMBLE_DETECT);
    assert!(radio.preamble_detected());
    assert_eq!(radio.client().irqs, 0);

    radio.engine_mut().calls.clear();
    radio.handle_events(EngineEvents::TIMER_EXPIRED);

    assert!(radio.engine().calls.is_empty());
    assert_eq!(radio.pending_event(), RadioEvent::Unknown);
    assert_eq!(radio.client().irqs, 0);
}

#[test]
fn test_listen_before_talk_quiet_channel_transmits() {
    let mut rx = RxPacket::new();
    let mut radio = ready(&mut rx);
    radio
        .start_carrier_sense(5000, CadExitMode::ListenBeforeTalk)
        .unwrap();
    assert_eq!(radio.cad_exit_mode(), CadExitMode::ListenBeforeTalk);
    assert_eq!(radio.engine().timers(), vec![5220]);

    radio.engine_mut().calls.clear();
    radio.handle_events(EngineEvents::TIMER_EXPIRED);

    assert_eq!(radio.cad_exit_mode(), CadExitMode::None);
    assert_eq!(radio.pending_event(), RadioEvent::Unknown);
    assert_eq!(radio.client().irqs, 1);
    assert_eq!(radio.engine().start_txs(), 1);
    assert!(radio.engine().timers().is_empty());
    assert_eq!(radio.state(), RadioState::Tx);

    radio.irq_process();
    assert!(radio.client().events.is_empty());
}

#[test]
fn test_listen_before_talk_tx_failure() {
    let mut rx = RxPacket::new();
    let mut radio = ready(&mut rx);
    radio
        .start_carrier_sense(5000, CadExitMode::ListenBeforeTalk)
        .unwrap();
    radio.engine_mut().fail_start_tx = true;

    radio.handle_events(EngineEvents::TIMER_EXPIRED);

    assert_eq!(radio.pending_event(), RadioEvent::TxTimeout);
}

#[test]
fn test_listen_before_talk_busy_channel() {
    let mut rx = RxPacket::new();
    let mut radio = ready(&mut rx);
    radio.engine_mut().rssi_dbm = Some(-70);
    radio
        .start_carrier_sense(5000, CadExitMode::ListenBeforeTalk)
        .unwrap();

    radio.handle_events(EngineEvents::RX_PREAMBLE_DETECT);

    assert_eq!(radio.cad_exit_mode(), CadExitMode::None);
    assert_eq!(radio.pending_event(), RadioEvent::CsDone);
    assert_eq!(radio.rx_packet().fsk_status.rssi_sync, -70);

    radio.handle_events(EngineEvents::TIMER_EXPIRED);
    assert_eq!(radio.engine().start_txs(), 0);
    radio.irq_process();
    assert_eq!(radio.client().events, vec![RadioEvent::CsDone]);
}

#[test]
fn test_listen_before_talk_invalid_rssi_is_not_stored() {
    let mut rx = RxPacket::new();
    let mut radio = ready(&mut rx);
    radio.engine_mut().rssi_dbm = Some(-70);
    radio
        .start_carrier_sense(5000, CadExitMode::ListenBeforeTalk)
        .unwrap();
    radio.handle_events(EngineEvents::RX_PREAMBLE_DETECT);

    radio.engine_mut().rssi_dbm = None;
    radio
        .start_carrier_sense(5000, CadExitMode::ListenBeforeTalk)
        .unwrap();
    radio.handle_events(EngineEvents::RX_PREAMBLE_DETECT);

    assert_eq!(radio.pending_event(), RadioEvent::CsDone);
    assert_eq!(radio.cad_exit_mode(), CadExitMode::None);
    assert_eq!(radio.rx_packet().fsk_status.rssi_sync, -70);
}

#[test]
fn test_tx_done() {
    let mut rx = RxPacket::new();
    let mut radio = ready(&mut rx);
    radio.start_tx(1000).unwrap();
    radio.engine_mut().calls.clear();

    radio.handle_events(EngineEvents::TX_PACKET_SENT);
    radio.irq_process();

    assert_eq!(radio.client().events, vec![RadioEvent::TxDone]);
    assert_eq!(radio.engine().calls, vec![Call::CancelTimer, Call::Idle]);
    assert!(!radio.timer_armed());
}

#[test]
fn test_tx_failure_and_timeout() {
    let mut rx = RxPacket::new();
    let mut radio = ready(&mut rx);

    radio.start_tx(0).unwrap();
    radio.handle_events(EngineEvents::TX_BLOCKED);
    assert_eq!(radio.pending_event(), RadioEvent::TxTimeout);

    radio.start_tx(1000).unwrap();
    radio.engine_mut().calls.clear();
    radio.handle_events(EngineEvents::TIMER_EXPIRED);
    assert_eq!(radio.pending_event(), RadioEvent::TxTimeout);
    assert_eq!(radio.engine().calls, vec![Call::Idle]);
}

#[test]
fn test_coexistence_yields_radio() {
    let mut rx = RxPacket::new();
    let mut radio = ready_with(&mut rx, coexistence());

    radio.start_tx(1000).unwrap();
    assert_eq!(
        radio.engine().calls[0],
        Call::StartTx {
            channel: 64,
            options: TxOptions::ALT_PREAMBLE_LEN,
            scheduler: Some(SchedulerInfo {
                priority: 100,
                slip_time_us: 0,
                transaction_time_us: 0,
            }),
        }
    );
    assert_eq!(radio.engine().timers(), vec![5220]);

    radio.engine_mut().calls.clear();
    radio.handle_events(EngineEvents::TX_PACKET_SENT);
    assert_eq!(radio.engine().calls, vec![Call::CancelTimer, Call::Yield]);

    radio.engine_mut().calls.clear();
    radio.standby().unwrap();
    assert_eq!(radio.engine().calls, vec![Call::Yield]);
}

#[test]
fn test_coexistence_rx_failure_idles() {
    let mut rx = RxPacket::new();
    let mut radio = ready_with(&mut rx, coexistence());
    radio.start_rx(0).unwrap();
    assert!(matches!(
        radio.engine().calls[1],
        Call::StartRx {
            scheduler: Some(SchedulerInfo { priority: 200, .. }),
            ..
        }
    ));

    radio.engine_mut().calls.clear();
    radio.handle_events(EngineEvents::RX_PACKET_ABORTED);
    assert_eq!(radio.engine().calls, vec![Call::Idle]);
}

#[test]
fn test_calibration_failure_is_not_reported() {
    let mut rx = RxPacket::new();
    let mut radio = ready(&mut rx);

    radio.handle_events(EngineEvents::CAL_NEEDED);
    radio.engine_mut().fail_calibrate = true;
    radio.handle_events(EngineEvents::CAL_NEEDED);

    assert_eq!(radio.engine().count(|call| *call == Call::Calibrate), 2);
    assert_eq!(radio.client().irqs, 0);
}

#[test]
fn test_modulation_params_switch_profile() {
    let mut rx = RxPacket::new();
    let mut radio = ready(&mut rx);

    radio.set_fsk_modulation_params(&modulation(50_000)).unwrap();
    assert!(radio.engine().calls.is_empty());

    radio.start_rx(1000).unwrap();
    radio.engine_mut().calls.clear();
    radio.set_fsk_modulation_params(&modulation(150_000)).unwrap();
    assert_eq!(
        radio.engine().calls,
        vec![
            Call::CancelTimer,
            Call::Idle,
            Call::Configure(RfProfile::Fsk150Kbps, EngineEvents::subscribed()),
            Call::SetTxPower(200),
        ]
    );
    assert_eq!(radio.state(), RadioState::Standby);
}

#[test]
fn test_modulation_params_unknown_bit_rate() {
    let mut rx = RxPacket::new();
    let mut radio = ready(&mut rx);

    assert_eq!(
        radio.set_fsk_modulation_params(&modulation(100_000)),
        Err(RadioError::HardwareError)
    );
    assert_eq!(
        radio.set_frequency(915_000_000),
        Err(RadioError::HardwareError)
    );
}

#[test]
fn test_packet_params_preamble() {
    let mut rx = RxPacket::new();
    let mut radio = ready(&mut rx);
    let mut params = FskPacketParams {
        preamble_length: 8,
        ..Default::default()
    };

    radio.set_fsk_packet_params(&params).unwrap();
    assert_eq!(radio.engine().calls, vec![Call::SetAltPreamble(64)]);

    params.preamble_length = 10_000;
    assert_eq!(
        radio.set_fsk_packet_params(&params),
        Err(RadioError::InvalidParams)
    );
}

#[test]
fn test_fsk_timing() {
    let mut rx = RxPacket::new();
    let radio = ready(&mut rx);
    let packet = FskPacketParams {
        preamble_length: 8,
        sync_word_length: 3,
        payload_length: 20,
        ..Default::default()
    };

    assert_eq!(radio.fsk_time_on_air(&modulation(50_000), &packet), 5);
    assert_eq!(radio.fsk_symbols_for_delay(&modulation(50_000), 1000), 50);
}

#[test]
fn test_sync_word_length() {
    let mut rx = RxPacket::new();
    let mut radio = ready(&mut rx);

    assert!(radio.set_fsk_sync_word(&[0x55, 0x90, 0x4E]).is_ok());
    assert_eq!(
        radio.set_fsk_sync_word(&[0; 9]),
        Err(RadioError::InvalidParams)
    );
    assert!(radio.set_fsk_whitening_seed(0x01FF).is_ok());
}

#[test]
fn test_unsupported_operations() {
    let mut rx = RxPacket::new();
    let mut radio = ready(&mut rx);

    assert_eq!(radio.modem_mode(), ModemMode::Fsk);
    assert!(radio.set_modem_mode(ModemMode::Fsk).is_ok());
    assert_eq!(
        radio.set_modem_mode(ModemMode::Lora),
        Err(RadioError::NotSupported)
    );
    assert_eq!(
        radio.set_tx_continuous_wave(915_000_000, 10),
        Err(RadioError::NotSupported)
    );
    assert_eq!(
        radio.set_tx_continuous_preamble(),
        Err(RadioError::NotSupported)
    );
    assert_eq!(
        radio.set_rx_duty_cycle(1000, 1000),
        Err(RadioError::NotSupported)
    );
    assert_eq!(radio.start_lora_cad(), Err(RadioError::NotSupported));
    assert_eq!(radio.set_lora_sync_word(0x12), Err(RadioError::NotSupported));
    assert_eq!(
        radio.set_lora_symbol_timeout(8),
        Err(RadioError::NotSupported)
    );
    assert_eq!(radio.cca_level_adjust(DataRate::Kbps50), Ok(0));
}
