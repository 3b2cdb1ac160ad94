#![no_std]
//! Sidewalk FSK Radio Driver
//!
//! This crate provides the radio layer a Sidewalk wireless stack runs on when
//! the transceiver is an EFR32 sub-GHz radio driven through a vendor RF
//! engine. It turns the stack's "send/receive a packet" requests into engine
//! operations, tracks the transceiver's operating state, builds and parses
//! Sidewalk FSK frames and computes the protocol's timing.
//!
//! # Features
//! - FSK at 50, 150 and 250 kbps
//! - 2-byte PHR with CRC-16 or CRC-32 frame check sequence
//! - Listen before talk through carrier sense windows
//! - Regional TX power limits
//! - Standalone or coexistence scheduler builds
//! - Blocking and async RSSI sampling (channel free, noise floor, random)
//!
//! # Architecture
//! The driver is organized into several modules:
//!
//! - [`Radio`]: driver context, stack-facing operations and event dispatcher
//!
//! - [`engine`]: the [`RfEngine`] trait implemented over the vendor engine
//!   - Engine events, channel plans, power curves and RX packet details
//!
//! - [`client`]: the [`RadioClient`] trait implemented by the stack
//!
//! - [`fsk`]: FSK parameters and frames
//!   - [`fsk::params`]: modulation and packet parameters
//!   - [`fsk::data_rate`]: data rate profiles
//!   - [`fsk::frame`]: TX preparation and RX parsing
//!
//! - [`phy`]: stateless framing and timing
//!   - [`phy::header`]: PHR codec
//!   - [`phy::crc`]: frame check sequences
//!   - [`phy::timing`]: time-on-air and symbol counts
//!
//! - [`config`]: board configuration and regional tables
//!
//! # Usage
//! Bring-up follows a fixed sequence:
//!
//! 1. Implement [`RfEngine`] over the vendor engine and [`RadioClient`] for the stack
//! 2. Create a [`Radio`] with a [`DeviceConfig`] and the stack's [`fsk::RxPacket`]
//! 3. Call [`Radio::init`]
//! 4. Forward every engine callback to [`Radio::handle_events`]
//! 5. Call [`Radio::irq_process`] from the stack's thread when
//!    [`RadioClient::on_irq`] fires
//!
//! # Important Notes
//! - Every operation takes `&mut self`; hosts that dispatch engine events
//!   from an interrupt share the [`Radio`] through a critical section mutex
//! - [`Radio::get_rssi`] returns [`RSSI_INVALID`] on failure
//! - Channel sampling always leaves the radio in standby
//!
//! # Example
//! ```no_run
//! use efr32_sidewalk_radio::{DeviceConfig, Radio, RadioClient, RadioError, RfEngine};
//! use efr32_sidewalk_radio::fsk::RxPacket;
//!
//! fn bring_up<E: RfEngine, C: RadioClient>(
//!     engine: E,
//!     client: C,
//!     rx_packet: &mut RxPacket,
//! ) -> Result<Radio<'_, E, C>, RadioError> {
//!     let mut radio = Radio::new(engine, client, DeviceConfig::default(), rx_packet);
//!     radio.init()?;
//!     radio.set_frequency(915_000_000)?;
//!
//!     Ok(radio)
//! }
//! ```

#[macro_use]
mod fmt;
#[macro_use]
mod macros;

pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod fsk;
pub mod phy;
mod radio;

pub use client::{RadioClient, RadioEvent};
pub use config::{BuildMode, DeviceConfig, Region};
pub use engine::{EngineEvents, RfEngine};
pub use error::RadioError;
pub use radio::{CadExitMode, ModemMode, Radio, RadioState, RSSI_INVALID};
