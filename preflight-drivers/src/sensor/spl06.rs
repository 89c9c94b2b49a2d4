//! SPL06-001 barometer (I2C)
//!
//! The part has no actuated self-test. Instead the check confirms the
//! factory coefficients are readable, the sensor finished its own
//! initialisation, and a single commanded pressure conversion produces a
//! plausible raw value.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use preflight_core::traits::{FailureReason, SelfTest};

/// 7-bit bus address (SDO high)
pub const ADDRESS: u8 = 0x76;

/// Product and revision id
pub const PRODUCT_ID: u8 = 0x10;

/// SPL06 register addresses
pub mod reg {
    /// Pressure result, 24-bit two's complement, MSB first
    pub const PSR_B2: u8 = 0x00;
    pub const PRS_CFG: u8 = 0x06;
    /// Measurement control and status flags
    pub const MEAS_CFG: u8 = 0x08;
    pub const ID: u8 = 0x0D;
}

/// `MEAS_CFG` bits
pub mod meas {
    pub const COEF_RDY: u8 = 0x80;
    pub const SENSOR_RDY: u8 = 0x40;
    pub const PRS_RDY: u8 = 0x10;
    /// Mode field
    pub const CTRL_MASK: u8 = 0x07;
    pub const CTRL_PRESSURE_ONCE: u8 = 0x01;
    pub const CTRL_CONTINUOUS: u8 = 0x07;
}

const POLL_ATTEMPTS: u8 = 10;
const POLL_PERIOD_MS: u32 = 10;

const RAW_MAX: i32 = 0x7F_FFFF;
const RAW_MIN: i32 = -0x80_0000;

/// SPL06 driver
pub struct Spl06<I2C, D> {
    i2c: I2C,
    delay: D,
    /// Mode found at open, restored on release
    saved_mode: u8,
}

impl<I2C: I2c, D: DelayNs> Spl06<I2C, D> {
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self {
            i2c,
            delay,
            saved_mode: meas::CTRL_CONTINUOUS,
        }
    }

    fn read_reg(&mut self, reg: u8) -> Result<u8, I2C::Error> {
        let mut buf = [0u8];
        self.i2c.write_read(ADDRESS, &[reg], &mut buf)?;
        Ok(buf[0])
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), I2C::Error> {
        self.i2c.write(ADDRESS, &[reg, value])
    }

    /// Read the last pressure conversion, sign extended
    pub fn read_raw_pressure(&mut self) -> Result<i32, I2C::Error> {
        let mut buf = [0u8; 3];
        self.i2c.write_read(ADDRESS, &[reg::PSR_B2], &mut buf)?;
        let raw = ((buf[0] as i32) << 16) | ((buf[1] as i32) << 8) | buf[2] as i32;
        Ok(if raw & 0x80_0000 != 0 { raw | !0xFF_FFFF } else { raw })
    }

    /// Command one pressure conversion and wait for it
    ///
    /// Returns `None` when the result never became ready.
    fn convert_once(&mut self) -> Result<Option<i32>, I2C::Error> {
        self.write_reg(reg::MEAS_CFG, meas::CTRL_PRESSURE_ONCE)?;
        for _ in 0..POLL_ATTEMPTS {
            self.delay.delay_ms(POLL_PERIOD_MS);
            if self.read_reg(reg::MEAS_CFG)? & meas::PRS_RDY != 0 {
                return self.read_raw_pressure().map(Some);
            }
        }
        Ok(None)
    }
}

impl<I2C: I2c, D: DelayNs> SelfTest for Spl06<I2C, D> {
    fn open(&mut self) -> Result<(), FailureReason> {
        match self.read_reg(reg::ID) {
            Ok(PRODUCT_ID) => {}
            _ => return Err(FailureReason::NoDevice),
        }
        let status = self.read_reg(reg::MEAS_CFG).map_err(|_| FailureReason::Bus)?;
        self.saved_mode = status & meas::CTRL_MASK;
        Ok(())
    }

    fn self_test(&mut self) -> Result<(), FailureReason> {
        let status = self.read_reg(reg::MEAS_CFG).map_err(|_| FailureReason::Bus)?;
        if status & meas::COEF_RDY == 0 {
            return Err(FailureReason::CalibrationMissing);
        }
        if status & meas::SENSOR_RDY == 0 {
            return Err(FailureReason::SelfTestFailed);
        }

        match self.convert_once().map_err(|_| FailureReason::Bus)? {
            Some(raw) if raw != 0 && raw != RAW_MAX && raw != RAW_MIN => Ok(()),
            _raw => {
                #[cfg(feature = "defmt")]
                defmt::warn!("spl06: implausible pressure conversion {}", _raw);
                Err(FailureReason::SelfTestFailed)
            }
        }
    }

    fn release(&mut self) {
        let mode = self.saved_mode;
        if self.write_reg(reg::MEAS_CFG, mode).is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("spl06: failed to restore measurement mode");
        }
    }
}
