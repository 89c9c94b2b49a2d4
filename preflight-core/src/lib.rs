//! Board-agnostic core logic for the preflight boot gate
//!
//! This crate contains all decision logic of the gate that does not
//! depend on specific hardware implementations:
//!
//! - Hardware abstraction traits (sensors, parameters, log, indicators)
//! - Sensor self-test sequencer (fail-fast, fixed order)
//! - RC calibration validator
//! - Failure alert state machine
//! - Command line parsing and gate orchestration
//! - Configuration type definitions

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod alert;
pub mod calibration;
pub mod cli;
pub mod config;
pub mod error;
pub mod gate;
pub mod report;
pub mod sequencer;
pub mod traits;
pub mod verdict;

#[cfg(test)]
pub(crate) mod mock;
