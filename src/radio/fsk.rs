//! FSK configuration

use super::{hw, Radio, RadioState};
use crate::client::RadioClient;
use crate::engine::{EngineEvents, RfEngine, RfProfile};
use crate::error::RadioError;
use crate::fsk::{FskModulationParams, FskPacketParams};
use crate::phy::{symbols_for_delay, time_on_air_ms};

/// Longest sync word accepted, in bytes
const MAX_SYNC_WORD_LENGTH: usize = 8;

impl<'a, E, C> Radio<'a, E, C>
where
    E: RfEngine,
    C: RadioClient,
{
    /// Sets the FSK sync word
    ///
    /// The RF profiles carry their own sync word, so only the length is
    /// checked.
    pub fn set_fsk_sync_word(&mut self, sync_word: &[u8]) -> Result<(), RadioError> {
        if sync_word.len() > MAX_SYNC_WORD_LENGTH {
            return Err(RadioError::InvalidParams);
        }
        Ok(())
    }

    /// Whitening is fixed by the RF profile
    pub fn set_fsk_whitening_seed(&mut self, _seed: u16) -> Result<(), RadioError> {
        Ok(())
    }

    /// Switches to the RF profile running at `params.bit_rate`
    ///
    /// Nothing is sent to the engine when the bit rate matches the active
    /// profile. Otherwise the engine is idled, reloaded with the new profile
    /// and the TX power is re-applied.
    ///
    /// # Errors
    /// * `RadioError::HardwareError` - no profile runs at this bit rate, or
    ///   the engine rejected it. The driver is left without an active profile
    ///   in the first case.
    pub fn set_fsk_modulation_params(
        &mut self,
        params: &FskModulationParams,
    ) -> Result<(), RadioError> {
        if self.rf_profile.map(RfProfile::bit_rate) == Some(params.bit_rate) {
            return Ok(());
        }

        let Some(profile) = RfProfile::from_bit_rate(params.bit_rate) else {
            error!("no rf profile for {} bps", params.bit_rate);
            self.rf_profile = None;
            return Err(RadioError::HardwareError);
        };

        self.cancel_timer();
        self.engine.idle();
        self.state = RadioState::Standby;

        hw(
            self.engine.configure(profile, EngineEvents::subscribed()),
            "configure",
        )?;
        self.rf_profile = Some(profile);
        debug!("rf profile {} bps", profile.bit_rate());

        self.on_channel_config_changed()
    }

    /// Programs the preamble transmitted by the next `start_tx`
    ///
    /// # Errors
    /// * `RadioError::InvalidParams` - preamble longer than the engine can express
    /// * `RadioError::HardwareError` - the engine rejected the length
    pub fn set_fsk_packet_params(&mut self, params: &FskPacketParams) -> Result<(), RadioError> {
        let bits = u16::try_from(params.preamble_bits()).map_err(|_| RadioError::InvalidParams)?;
        hw(
            self.engine.set_tx_alt_preamble_length(bits),
            "set preamble length",
        )
    }

    /// Time-on-air of a frame in milliseconds
    pub fn fsk_time_on_air(
        &self,
        modulation: &FskModulationParams,
        packet: &FskPacketParams,
    ) -> u32 {
        time_on_air_ms(packet, modulation)
    }

    /// Whole symbols transmitted within `delay_us`
    pub fn fsk_symbols_for_delay(&self, modulation: &FskModulationParams, delay_us: u32) -> u32 {
        symbols_for_delay(modulation.bit_rate, delay_us)
    }
}
