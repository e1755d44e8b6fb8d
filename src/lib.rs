#![cfg_attr(not(test), no_std)]
#![cfg_attr(feature = "strict", deny(warnings))]
#![allow(dead_code)]
#![allow(clippy::identity_op)]

//! # Library for the MCP2518FD CAN FD controller
//!
//! The controller is operated over SPI. The crate covers device bring-up
//! (reset, oscillator ready polling, device identity verification, operation
//! mode transitions), bit timing/FIFO/filter configuration and message
//! transmission and reception.
//!
//! Crate features:
//! * CAN 2.0 and CAN FD frame format support
//! * Standard and extended ID formats
//! * no_std support
//!
//! All waits during bring-up are bounded: polling loops run against deadlines
//! derived from an injected [embedded_time::Clock], so a missing crystal or a
//! wrong wiring surfaces as a distinct timeout error instead of a hang.
//!
//!## CAN TX/RX example
//!
//!```
//!use mcp2518fd::can::{CanController, MCP2518FD};
//!use mcp2518fd::config::*;
//!use mcp2518fd::example::{ExampleCSPin, ExampleClock, ExampleSPIBus};
//!use mcp2518fd::filter::Filter;
//!use mcp2518fd::message::{Can20, TxMessage};
//!use bytes::Bytes;
//!use embedded_can::{Id, StandardId};
//!
//!let cs_pin = ExampleCSPin {};
//!let spi_bus = ExampleSPIBus::default();
//!let clock = ExampleClock::default();
//!
//!let mut controller = MCP2518FD::new(spi_bus, cs_pin);
//!
//!// reset, verify and configure CAN controller
//!controller
//!    .configure(
//!        &Configuration {
//!            clock: ClockConfiguration {
//!                clock_output: ClockOutputDivisor::DivideBy10,
//!                system_clock: SystemClockDivisor::DivideBy1,
//!                disable_clock: false,
//!                pll: PLLSetting::TenTimesPLL,
//!            },
//!            bit_timing: BitTimingConfiguration::default(),
//!            fifo: FifoConfiguration {
//!                rx_size: 16,
//!                tx_attempts: RetransmissionAttempts::Three,
//!                tx_priority: 10,
//!                pl_size: PayloadSize::EightBytes,
//!                tx_size: 20,
//!                tx_enable: true,
//!            },
//!            mode: RequestMode::NormalCANFD,
//!        },
//!        &clock,
//!    )
//!    .unwrap();
//!
//!// Create message frame
//!let can_id = Id::Standard(StandardId::new(0x55).unwrap());
//!let message_type = Can20::<8> {};
//!let payload = [1, 2, 3, 4, 5, 6, 7, 8];
//!let pl_bytes = Bytes::copy_from_slice(&payload);
//!let can_message = TxMessage::new(message_type, pl_bytes, can_id).unwrap();
//!
//!// Create and set filter object
//!let filter = Filter::new(can_id, 0).unwrap();
//!let _ = controller.set_filter_object(filter);
//!
//!// Transmit CAN message
//!controller.transmit(&can_message, true).unwrap();
//!
//!let mut buff = [0u8; 8];
//!// Receive CAN message
//!let result = controller.receive(&mut buff, true);
//!assert!(result.is_ok());
//!assert_eq!(buff, [1, 2, 3, 4, 5, 6, 7, 8]);
//!```

extern crate alloc;

pub mod can;
pub mod config;
pub mod status;

pub mod filter;
pub mod message;

pub mod example;
#[cfg(test)]
pub(crate) mod mocks;
mod registers;
#[cfg(test)]
mod tests;
