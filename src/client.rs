//! Stack-facing callbacks
//!
//! The wireless stack supplies a [`RadioClient`] when it constructs the
//! [`Radio`](crate::Radio). Event delivery is split in two halves:
//!
//! 1. The dispatcher, running in the engine's interrupt context, latches one
//!    [`RadioEvent`] and calls [`RadioClient::on_irq`]
//! 2. The stack, on its own thread, calls
//!    [`Radio::irq_process`](crate::Radio::irq_process) which delivers the
//!    latched event to [`RadioClient::on_event`]

use core::time::Duration;

/// Notification raised to the stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioEvent {
    /// No-op status, never delivered to [`RadioClient::on_event`]
    Unknown,
    TxDone,
    RxDone,
    CadDone,
    CadTimeout,
    RxError,
    TxTimeout,
    RxTimeout,
    /// Carrier sense saw activity on the channel
    CsDone,
    CsTimeout,
    HeaderError,
}

/// Capabilities the hosting stack provides to the driver
pub trait RadioClient {
    /// Receives a latched event from [`Radio::irq_process`](crate::Radio::irq_process)
    fn on_event(&mut self, event: RadioEvent);

    /// Signals, from interrupt context, that an event was latched
    fn on_irq(&mut self) {}

    /// Current uptime, used to timestamp received packets
    fn uptime(&mut self) -> Option<Duration> {
        None
    }
}
