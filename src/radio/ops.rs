//! Stack-facing radio operations

use embedded_hal::delay::DelayNs;

use super::sampling::{CarrierSense, NoiseAverage, RandomFold, Sampler};
use super::{hw, CadExitMode, ModemMode, Radio, RadioState, RSSI_INVALID};
use crate::client::RadioClient;
use crate::config::{Region, RegionalParam, StateTransitionTimings, NA_FSK_BAND_HZ};
use crate::engine::{EngineEvents, RfEngine, RfProfile};
use crate::error::RadioError;
use crate::fsk::{DataRate, MAX_FRAME_LENGTH};
use crate::phy::{bit_reverse8, PHR_LENGTH};

impl<'a, E, C> Radio<'a, E, C>
where
    E: RfEngine,
    C: RadioClient,
{
    /// Brings the radio up
    ///
    /// Applies the configured region, initializes and calibrates the engine
    /// with the 50 kbps profile, moves to standby and sets the region's
    /// 50 kbps max TX power.
    ///
    /// # Errors
    /// * `RadioError::HardwareError` - the region is not in the table or an
    ///   engine call failed
    pub fn init(&mut self) -> Result<(), RadioError> {
        self.set_region(self.config.regional.region).map_err(|_| {
            error!("radio init: region not supported");
            RadioError::HardwareError
        })?;

        self.bring_up_engine()?;

        self.state = RadioState::Unknown;
        self.standby()?;

        let power = self.max_tx_power(DataRate::Kbps50)?;
        self.set_tx_power(power)?;

        info!("radio up, region {}", self.regional.region as u8);
        Ok(())
    }

    fn bring_up_engine(&mut self) -> Result<(), RadioError> {
        if self.engine_ready {
            return Ok(());
        }

        let profile = RfProfile::Fsk50Kbps;
        hw(self.engine.init(), "init")?;
        hw(self.engine.calibrate_init(profile), "calibrate init")?;
        hw(
            self.engine.configure(profile, EngineEvents::subscribed()),
            "configure",
        )?;

        self.rf_profile = Some(profile);
        self.engine_ready = true;
        Ok(())
    }

    pub fn modem_mode(&self) -> ModemMode {
        ModemMode::Fsk
    }

    /// Selects the modem; only FSK is available
    pub fn set_modem_mode(&mut self, mode: ModemMode) -> Result<(), RadioError> {
        match mode {
            ModemMode::Fsk => Ok(()),
            ModemMode::Lora => Err(RadioError::NotSupported),
        }
    }

    /// Tunes to `frequency_hz`
    ///
    /// # Errors
    /// * `RadioError::InvalidParams` - outside the North America FSK band
    ///   while that region is active, or outside the profile's channel plan
    /// * `RadioError::HardwareError` - no RF profile is loaded
    pub fn set_frequency(&mut self, frequency_hz: u32) -> Result<(), RadioError> {
        if self.regional.region == Region::Na && !NA_FSK_BAND_HZ.contains(&frequency_hz) {
            return Err(RadioError::InvalidParams);
        }

        let profile = self.rf_profile.ok_or(RadioError::HardwareError)?;
        let channel = self
            .engine
            .channel_plan(profile)
            .channel_for(frequency_hz)
            .ok_or(RadioError::InvalidParams)?;

        self.channel = channel;
        self.frequency_hz = frequency_hz;
        Ok(())
    }

    pub fn frequency(&self) -> u32 {
        self.frequency_hz
    }

    /// Channel of the current frequency in the active profile's plan
    pub fn channel(&self) -> u16 {
        self.channel
    }

    /// Power range of the configured PA as `(max, min)` in dBm
    pub fn tx_power_range(&self) -> Result<(i8, i8), RadioError> {
        let curve = self
            .engine
            .tx_power_curve(self.config.tx_power.mode)
            .ok_or(RadioError::HardwareError)?;
        Ok((
            (curve.max_deci_dbm / 10) as i8,
            (curve.min_deci_dbm / 10) as i8,
        ))
    }

    /// Last TX power applied, in dBm
    pub fn tx_power(&self) -> i8 {
        self.tx_power.unwrap_or(0)
    }

    /// Sets the TX power in dBm
    ///
    /// The value is clamped to the PA's range and to the region's limit for
    /// the active data rate. The engine is only written when the clamped value
    /// differs from the last one applied.
    pub fn set_tx_power(&mut self, power: i8) -> Result<(), RadioError> {
        let (hw_max, min) = self.tx_power_range()?;
        let max = match self.active_data_rate() {
            Some(rate) => hw_max.min(self.regional.max_tx_power[rate.index()]),
            None => hw_max,
        };

        let power = if power > max {
            warn!("tx power {} above max, using {}", power, max);
            max
        } else if power < min {
            warn!("tx power {} below min, using {}", power, min);
            min
        } else {
            power
        };

        if self.tx_power == Some(power) {
            return Ok(());
        }
        self.apply_tx_power(power)
    }

    /// Re-applies the last TX power after the engine reloaded its channel
    /// configuration
    pub fn on_channel_config_changed(&mut self) -> Result<(), RadioError> {
        match self.tx_power {
            Some(power) => self.apply_tx_power(power),
            None => Ok(()),
        }
    }

    fn apply_tx_power(&mut self, power: i8) -> Result<(), RadioError> {
        if !self.pa_configured {
            hw(
                self.engine.configure_tx_power(&self.config.tx_power),
                "configure pa",
            )?;
            self.pa_configured = true;
        }
        hw(self.engine.set_tx_power(power as i16 * 10), "set tx power")?;
        self.tx_power = Some(power);
        Ok(())
    }

    fn active_data_rate(&self) -> Option<DataRate> {
        self.rf_profile.map(|profile| match profile {
            RfProfile::Fsk50Kbps => DataRate::Kbps50,
            RfProfile::Fsk150Kbps => DataRate::Kbps150,
            RfProfile::Fsk250Kbps => DataRate::Kbps250,
        })
    }

    /// Highest TX power allowed at `data_rate`: the lesser of the PA maximum
    /// and the active region's limit
    ///
    /// # Errors
    /// * `RadioError::InvalidParams` - `data_rate` has no FSK profile
    pub fn max_tx_power(&self, data_rate: DataRate) -> Result<i8, RadioError> {
        if !data_rate.is_fsk() {
            return Err(RadioError::InvalidParams);
        }
        let (hw_max, _) = self.tx_power_range()?;
        Ok(hw_max.min(self.regional.max_tx_power[data_rate.index()]))
    }

    /// CCA threshold adjustment of the active region at `data_rate`
    pub fn cca_level_adjust(&self, data_rate: DataRate) -> Result<i8, RadioError> {
        if !data_rate.is_fsk() {
            return Err(RadioError::InvalidParams);
        }
        Ok(self.regional.cca_level_adjust[data_rate.index()])
    }

    /// Antenna gain of the active region in hundredths of a dBi
    pub fn antenna_gain(&self) -> i16 {
        self.regional.ant_dbi
    }

    pub fn state_transition_timings(&self) -> StateTransitionTimings {
        self.config.state_timings
    }

    /// Activates the regional parameters of `region`
    ///
    /// # Errors
    /// * `RadioError::InvalidParams` - `region` is [`Region::None`]
    /// * `RadioError::NotSupported` - the table has no entry for `region`
    pub fn set_region(&mut self, region: Region) -> Result<(), RadioError> {
        if region == Region::None {
            return Err(RadioError::InvalidParams);
        }
        let param: RegionalParam = *self
            .config
            .regional
            .find(region)
            .ok_or(RadioError::NotSupported)?;
        self.regional = param;
        Ok(())
    }

    pub fn region(&self) -> Region {
        self.regional.region
    }

    /// Loads a prepared frame into the TX FIFO
    ///
    /// The PHR is written as is; every following byte is bit reversed for the
    /// engine's LSB first shifter.
    ///
    /// # Errors
    /// * `RadioError::InvalidParams` - empty frame or longer than 255 bytes
    /// * `RadioError::HardwareError` - the FIFO write failed
    pub fn set_tx_payload(&mut self, frame: &[u8]) -> Result<(), RadioError> {
        if frame.is_empty() || frame.len() > MAX_FRAME_LENGTH {
            return Err(RadioError::InvalidParams);
        }

        let mut fifo = [0u8; MAX_FRAME_LENGTH];
        let split = frame.len().min(PHR_LENGTH);
        fifo[..split].copy_from_slice(&frame[..split]);
        for (dst, src) in fifo[split..frame.len()].iter_mut().zip(&frame[split..]) {
            *dst = bit_reverse8(*src);
        }

        hw(self.engine.write_tx_fifo(&fifo[..frame.len()]), "write tx fifo")
    }

    /// Receives until stopped
    pub fn start_continuous_rx(&mut self) -> Result<(), RadioError> {
        self.start_rx(0)
    }

    /// Opens a carrier sense window
    ///
    /// With [`CadExitMode::ListenBeforeTalk`], a preamble during the window
    /// raises [`RadioEvent::CsDone`](crate::RadioEvent::CsDone); a quiet
    /// window starts the queued transmit when the timer expires.
    pub fn start_carrier_sense(
        &mut self,
        timeout_us: u32,
        exit_mode: CadExitMode,
    ) -> Result<(), RadioError> {
        self.cad_exit_mode = exit_mode;
        self.start_rx(timeout_us).inspect_err(|_| {
            self.cad_exit_mode = CadExitMode::None;
        })
    }

    /// Instantaneous RSSI in dBm
    ///
    /// Returns [`RSSI_INVALID`] when the engine has no valid sample; callers
    /// must treat that value as a failure.
    pub fn get_rssi(&mut self) -> i16 {
        match self.engine.rssi(self.config.build_mode.rssi_wait()) {
            Some(quarter_dbm) => quarter_dbm >> 2,
            None => {
                error!("could not get rssi");
                RSSI_INVALID
            }
        }
    }

    /// Listens on `frequency_hz` for `window_us` and reports whether every
    /// sample stayed at or below `threshold` dBm
    ///
    /// The radio is back in standby when this returns, whatever the outcome.
    ///
    /// # Errors
    /// * `RadioError::HardwareError` - tuning, receiving or sampling failed
    pub fn is_channel_free<D: DelayNs>(
        &mut self,
        delay: &mut D,
        frequency_hz: u32,
        threshold: i16,
        window_us: u32,
    ) -> Result<bool, RadioError> {
        let sampler = CarrierSense::new(
            threshold,
            window_us,
            self.config.sampling.channel_free_interval_us,
        );
        let result = self
            .begin_sampling(Some(frequency_hz))
            .and_then(|()| self.sample(delay, sampler));
        self.finish_sampling(result)
    }

    /// Averages the configured number of RSSI samples on `frequency_hz`
    ///
    /// The radio is back in standby when this returns, whatever the outcome.
    ///
    /// # Errors
    /// * `RadioError::HardwareError` - tuning, receiving or any sample failed
    pub fn get_channel_noise<D: DelayNs>(
        &mut self,
        delay: &mut D,
        frequency_hz: u32,
    ) -> Result<i16, RadioError> {
        let sampling = self.config.sampling;
        let sampler = NoiseAverage::new(sampling.noise_samples, sampling.noise_interval_us);
        let result = self
            .begin_sampling(Some(frequency_hz))
            .and_then(|()| self.sample(delay, sampler));
        self.finish_sampling(result)
    }

    /// Derives a 32 bit value from RSSI noise on the current channel
    ///
    /// # Important Notes
    /// - Low quality entropy, not suitable for cryptographic use
    pub fn get_random<D: DelayNs>(&mut self, delay: &mut D) -> Result<u32, RadioError> {
        let sampler = self.random_sampler();
        let result = self
            .begin_sampling(None)
            .and_then(|()| self.sample(delay, sampler));
        self.finish_sampling(result)
    }

    /// Async variant of [`is_channel_free`](Self::is_channel_free)
    pub async fn is_channel_free_async<D: embedded_hal_async::delay::DelayNs>(
        &mut self,
        delay: &mut D,
        frequency_hz: u32,
        threshold: i16,
        window_us: u32,
    ) -> Result<bool, RadioError> {
        let sampler = CarrierSense::new(
            threshold,
            window_us,
            self.config.sampling.channel_free_interval_us,
        );
        let result = match self.begin_sampling(Some(frequency_hz)) {
            Ok(()) => self.sample_async(delay, sampler).await,
            Err(e) => Err(e),
        };
        self.finish_sampling(result)
    }

    /// Async variant of [`get_channel_noise`](Self::get_channel_noise)
    pub async fn get_channel_noise_async<D: embedded_hal_async::delay::DelayNs>(
        &mut self,
        delay: &mut D,
        frequency_hz: u32,
    ) -> Result<i16, RadioError> {
        let sampling = self.config.sampling;
        let sampler = NoiseAverage::new(sampling.noise_samples, sampling.noise_interval_us);
        let result = match self.begin_sampling(Some(frequency_hz)) {
            Ok(()) => self.sample_async(delay, sampler).await,
            Err(e) => Err(e),
        };
        self.finish_sampling(result)
    }

    /// Async variant of [`get_random`](Self::get_random)
    pub async fn get_random_async<D: embedded_hal_async::delay::DelayNs>(
        &mut self,
        delay: &mut D,
    ) -> Result<u32, RadioError> {
        let sampler = self.random_sampler();
        let result = match self.begin_sampling(None) {
            Ok(()) => self.sample_async(delay, sampler).await,
            Err(e) => Err(e),
        };
        self.finish_sampling(result)
    }

    fn random_sampler(&self) -> RandomFold {
        let sampling = self.config.sampling;
        RandomFold::new(
            sampling.random_samples,
            sampling.random_interval_us,
            sampling.random_invalid_budget,
        )
    }

    fn begin_sampling(&mut self, frequency_hz: Option<u32>) -> Result<(), RadioError> {
        if let Some(frequency_hz) = frequency_hz {
            self.set_frequency(frequency_hz)
                .map_err(|_| RadioError::HardwareError)?;
        }
        self.start_continuous_rx()
            .map_err(|_| RadioError::HardwareError)
    }

    fn finish_sampling<T>(&mut self, result: Result<T, RadioError>) -> Result<T, RadioError> {
        let standby = self.standby().map_err(|_| RadioError::HardwareError);
        let value = result?;
        standby?;
        Ok(value)
    }

    fn sample<D: DelayNs, S: Sampler>(
        &mut self,
        delay: &mut D,
        mut sampler: S,
    ) -> Result<S::Output, RadioError> {
        loop {
            delay.delay_us(sampler.interval_us());
            if let Some(output) = sampler.push(self.get_rssi())? {
                return Ok(output);
            }
        }
    }

    async fn sample_async<D: embedded_hal_async::delay::DelayNs, S: Sampler>(
        &mut self,
        delay: &mut D,
        mut sampler: S,
    ) -> Result<S::Output, RadioError> {
        loop {
            delay.delay_us(sampler.interval_us()).await;
            if let Some(output) = sampler.push(self.get_rssi())? {
                return Ok(output);
            }
        }
    }

    /// Continuous wave transmission is not available
    pub fn set_tx_continuous_wave(&mut self, _frequency_hz: u32, _power: i8) -> Result<(), RadioError> {
        Err(RadioError::NotSupported)
    }

    /// Continuous preamble transmission is not available
    pub fn set_tx_continuous_preamble(&mut self) -> Result<(), RadioError> {
        Err(RadioError::NotSupported)
    }

    /// RX duty cycling is not available
    pub fn set_rx_duty_cycle(&mut self, _rx_time_us: u32, _sleep_time_us: u32) -> Result<(), RadioError> {
        Err(RadioError::NotSupported)
    }

    /// LoRa channel activity detection is not available
    pub fn start_lora_cad(&mut self) -> Result<(), RadioError> {
        Err(RadioError::NotSupported)
    }

    /// LoRa sync word selection is not available
    pub fn set_lora_sync_word(&mut self, _sync_word: u16) -> Result<(), RadioError> {
        Err(RadioError::NotSupported)
    }

    /// LoRa symbol timeout is not available
    pub fn set_lora_symbol_timeout(&mut self, _symbols: u8) -> Result<(), RadioError> {
        Err(RadioError::NotSupported)
    }
}
