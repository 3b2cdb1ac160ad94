//! Driver error type

use core::fmt;

/// Errors returned by the radio driver
///
/// Every fallible driver call reports one of these synchronously. Failures
/// detected while dispatching hardware events are never returned; they are
/// turned into an RX error or TX timeout notification instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioError {
    /// Malformed caller input, such as an unsupported data rate or an
    /// out-of-band frequency
    InvalidParams,
    /// The RF engine rejected or failed a command
    HardwareError,
    /// The operation is not available on this transceiver (LoRa, continuous wave)
    NotSupported,
    /// Clock or timestamp failure
    Generic,
}

impl fmt::Display for RadioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParams => write!(f, "invalid parameters"),
            Self::HardwareError => write!(f, "radio hardware error"),
            Self::NotSupported => write!(f, "operation not supported"),
            Self::Generic => write!(f, "generic radio error"),
        }
    }
}

impl core::error::Error for RadioError {}
