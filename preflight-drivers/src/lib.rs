//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in preflight-core:
//!
//! - Sensor self-tests (HMC5883L, ICM-42688, SPL06) and the board suite
//! - Status LEDs on GPIO and a PWM buzzer
//! - Fixed-capacity parameter table

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod indicator;
pub mod params;
pub mod sensor;

#[cfg(test)]
pub(crate) mod mock;
