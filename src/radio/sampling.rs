//! RSSI sampling accumulators
//!
//! Carrier sense, noise measurement and random number generation all poll
//! the instantaneous RSSI at a fixed interval. Each accumulator consumes one
//! sample at a time so the blocking and async loops share the same logic.

use super::RSSI_INVALID;
use crate::error::RadioError;

pub(super) trait Sampler {
    type Output;

    /// Spacing between samples in µs
    fn interval_us(&self) -> u32;

    /// Consumes one sample; `Some` once the measurement is complete
    fn push(&mut self, rssi: i16) -> Result<Option<Self::Output>, RadioError>;
}

/// Reports busy as soon as one sample exceeds the threshold
pub(super) struct CarrierSense {
    threshold: i16,
    interval_us: u32,
    remaining: u32,
}

impl CarrierSense {
    pub(super) fn new(threshold: i16, window_us: u32, interval_us: u32) -> Self {
        let interval_us = interval_us.max(1);
        if window_us < interval_us {
            warn!(
                "channel free window raised from {} to {} us",
                window_us, interval_us
            );
        }
        Self {
            threshold,
            interval_us,
            remaining: window_us.div_ceil(interval_us).max(1),
        }
    }
}

impl Sampler for CarrierSense {
    type Output = bool;

    fn interval_us(&self) -> u32 {
        self.interval_us
    }

    fn push(&mut self, rssi: i16) -> Result<Option<bool>, RadioError> {
        if rssi == RSSI_INVALID {
            return Err(RadioError::HardwareError);
        }
        if rssi > self.threshold {
            return Ok(Some(false));
        }
        self.remaining -= 1;
        Ok((self.remaining == 0).then_some(true))
    }
}

/// Averages a fixed number of samples
pub(super) struct NoiseAverage {
    interval_us: u32,
    samples: u16,
    taken: u16,
    sum: i32,
}

impl NoiseAverage {
    pub(super) fn new(samples: u16, interval_us: u32) -> Self {
        Self {
            interval_us,
            samples: samples.max(1),
            taken: 0,
            sum: 0,
        }
    }
}

impl Sampler for NoiseAverage {
    type Output = i16;

    fn interval_us(&self) -> u32 {
        self.interval_us
    }

    fn push(&mut self, rssi: i16) -> Result<Option<i16>, RadioError> {
        if rssi == RSSI_INVALID {
            return Err(RadioError::HardwareError);
        }
        self.sum += rssi as i32;
        self.taken += 1;
        Ok((self.taken == self.samples).then(|| (self.sum / self.samples as i32) as i16))
    }
}

/// Folds noisy samples into a 32 bit value
///
/// This is a weak entropy source and must not be used for key material.
/// Zero and invalid samples are skipped until the invalid budget runs out.
pub(super) struct RandomFold {
    interval_us: u32,
    samples: u8,
    taken: u8,
    invalid: u16,
    invalid_budget: u16,
    noise: u32,
    value: u32,
}

impl RandomFold {
    pub(super) fn new(samples: u8, interval_us: u32, invalid_budget: u8) -> Self {
        Self {
            interval_us,
            samples: samples.max(1),
            taken: 0,
            invalid: 0,
            invalid_budget: invalid_budget.into(),
            noise: 0,
            value: 0,
        }
    }
}

impl Sampler for RandomFold {
    type Output = u32;

    fn interval_us(&self) -> u32 {
        self.interval_us
    }

    fn push(&mut self, rssi: i16) -> Result<Option<u32>, RadioError> {
        if rssi == 0 || rssi == RSSI_INVALID {
            if self.invalid > self.invalid_budget {
                return Err(RadioError::HardwareError);
            }
            self.invalid += 1;
            return Ok(None);
        }

        self.noise = self.noise.wrapping_add(-(rssi as i32) as u32);
        let seed = self.noise % 8;
        let shift = ((seed + self.taken as u32) % 8) * 4;
        self.value |= (self.noise % 16) << shift;
        self.value |= self.noise;
        self.taken += 1;

        Ok((self.taken == self.samples).then_some(self.value))
    }
}
