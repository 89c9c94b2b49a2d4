//! HMC5883L magnetometer (I2C)
//!
//! # Self-test
//!
//! The device has a built-in positive bias mode that drives a known current
//! through the offset straps, producing roughly 1.1 Ga on every axis. With
//! the gain set to 390 LSB/Ga each axis must read within 243..=575 LSB.
//! The first sample after changing the configuration uses the old gain and
//! is discarded.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use preflight_core::traits::{FailureReason, ParamStore, SelfTest};

/// 7-bit bus address
pub const ADDRESS: u8 = 0x1E;

/// Contents of the identification registers A..C
pub const IDENTITY: [u8; 3] = *b"H43";

/// HMC5883L register addresses
pub mod reg {
    /// Configuration A: averaging, output rate, measurement mode
    pub const CONFIG_A: u8 = 0x00;
    /// Configuration B: gain
    pub const CONFIG_B: u8 = 0x01;
    /// Operating mode
    pub const MODE: u8 = 0x02;
    /// First data register (X MSB); axis order is X, Z, Y
    pub const DATA_X_MSB: u8 = 0x03;
    /// Identification register A
    pub const ID_A: u8 = 0x0A;
}

/// 8-sample average, 15 Hz, normal measurement
const CONFIG_A_NORMAL: u8 = 0x70;
/// 8-sample average, 15 Hz, positive bias
const CONFIG_A_POSITIVE_BIAS: u8 = 0x71;
/// Gain 1.3 Ga (1090 LSB/Ga)
const CONFIG_B_NORMAL: u8 = 0x20;
/// Gain 4.7 Ga (390 LSB/Ga)
const CONFIG_B_SELF_TEST: u8 = 0xA0;
const MODE_CONTINUOUS: u8 = 0x00;

/// Time for one conversion at 15 Hz, with margin
const SAMPLE_PERIOD_MS: u32 = 70;

/// Accepted self-test response per axis at gain 5
pub const SELF_TEST_LIMITS: core::ops::RangeInclusive<i16> = 243..=575;

/// Hard-iron offsets and soft-iron scales
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MagCalibration {
    pub offset: [f32; 3],
    pub scale: [f32; 3],
}

impl MagCalibration {
    const OFFSET_PARAMS: [&'static str; 3] = ["CAL_MAG_X_OFF", "CAL_MAG_Y_OFF", "CAL_MAG_Z_OFF"];
    const SCALE_PARAMS: [&'static str; 3] = ["CAL_MAG_X_SCALE", "CAL_MAG_Y_SCALE", "CAL_MAG_Z_SCALE"];

    /// Load the calibration from the parameter store
    ///
    /// Returns `None` unless all six values are present.
    pub fn from_params<P: ParamStore + ?Sized>(params: &P) -> Option<Self> {
        let mut cal = Self {
            offset: [0.0; 3],
            scale: [1.0; 3],
        };
        for axis in 0..3 {
            cal.offset[axis] = params.get(Self::OFFSET_PARAMS[axis])?;
            cal.scale[axis] = params.get(Self::SCALE_PARAMS[axis])?;
        }
        Some(cal)
    }

    /// Finite offsets and strictly positive finite scales
    pub fn is_usable(&self) -> bool {
        self.offset.iter().all(|v| v.is_finite())
            && self.scale.iter().all(|&s| s.is_finite() && s > 0.0)
    }
}

/// HMC5883L driver
pub struct Hmc5883<I2C, D> {
    i2c: I2C,
    delay: D,
    calibration: Option<MagCalibration>,
}

impl<I2C: I2c, D: DelayNs> Hmc5883<I2C, D> {
    pub fn new(i2c: I2C, delay: D, calibration: Option<MagCalibration>) -> Self {
        Self {
            i2c,
            delay,
            calibration,
        }
    }

    pub fn calibration(&self) -> Option<&MagCalibration> {
        self.calibration.as_ref()
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), I2C::Error> {
        self.i2c.write(ADDRESS, &[reg, value])
    }

    fn read_identity(&mut self) -> Result<[u8; 3], I2C::Error> {
        let mut id = [0u8; 3];
        self.i2c.write_read(ADDRESS, &[reg::ID_A], &mut id)?;
        Ok(id)
    }

    /// Read one sample as `[x, y, z]`
    pub fn read_raw(&mut self) -> Result<[i16; 3], I2C::Error> {
        let mut data = [0u8; 6];
        self.i2c.write_read(ADDRESS, &[reg::DATA_X_MSB], &mut data)?;

        let x = i16::from_be_bytes([data[0], data[1]]);
        let z = i16::from_be_bytes([data[2], data[3]]);
        let y = i16::from_be_bytes([data[4], data[5]]);
        Ok([x, y, z])
    }

    fn positive_bias_sample(&mut self) -> Result<[i16; 3], I2C::Error> {
        self.write_reg(reg::CONFIG_A, CONFIG_A_POSITIVE_BIAS)?;
        self.write_reg(reg::CONFIG_B, CONFIG_B_SELF_TEST)?;
        self.write_reg(reg::MODE, MODE_CONTINUOUS)?;

        self.delay.delay_ms(SAMPLE_PERIOD_MS);
        let _stale = self.read_raw()?;
        self.delay.delay_ms(SAMPLE_PERIOD_MS);
        self.read_raw()
    }

    fn restore(&mut self) -> Result<(), I2C::Error> {
        self.write_reg(reg::CONFIG_A, CONFIG_A_NORMAL)?;
        self.write_reg(reg::CONFIG_B, CONFIG_B_NORMAL)?;
        self.write_reg(reg::MODE, MODE_CONTINUOUS)
    }
}

impl<I2C: I2c, D: DelayNs> SelfTest for Hmc5883<I2C, D> {
    fn open(&mut self) -> Result<(), FailureReason> {
        match self.read_identity() {
            Ok(id) if id == IDENTITY => Ok(()),
            Ok(_id) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("hmc5883: unexpected identity {}", _id);
                Err(FailureReason::NoDevice)
            }
            Err(_) => Err(FailureReason::NoDevice),
        }
    }

    fn self_test(&mut self) -> Result<(), FailureReason> {
        if !self.calibration.is_some_and(|cal| cal.is_usable()) {
            return Err(FailureReason::CalibrationMissing);
        }

        let sample = self
            .positive_bias_sample()
            .map_err(|_| FailureReason::Bus)?;

        if sample.iter().all(|axis| SELF_TEST_LIMITS.contains(axis)) {
            Ok(())
        } else {
            #[cfg(feature = "defmt")]
            defmt::warn!("hmc5883: self-test response {} out of limits", sample);
            Err(FailureReason::SelfTestFailed)
        }
    }

    fn release(&mut self) {
        if self.restore().is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("hmc5883: failed to restore normal configuration");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{NoopDelay, RegisterI2c};
    use crate::params::ParamTable;
    use proptest::prelude::*;

    const CALIBRATED: MagCalibration = MagCalibration {
        offset: [12.0, -4.0, 30.0],
        scale: [1.02, 0.98, 1.0],
    };

    fn device(x: i16, y: i16, z: i16) -> RegisterI2c {
        let mut bus = RegisterI2c::new(ADDRESS);
        bus.load(reg::ID_A, &IDENTITY);
        let mut data = [0u8; 6];
        data[0..2].copy_from_slice(&x.to_be_bytes());
        data[2..4].copy_from_slice(&z.to_be_bytes());
        data[4..6].copy_from_slice(&y.to_be_bytes());
        bus.load(reg::DATA_X_MSB, &data);
        bus
    }

    fn driver(bus: RegisterI2c, cal: Option<MagCalibration>) -> Hmc5883<RegisterI2c, NoopDelay> {
        Hmc5883::new(bus, NoopDelay::default(), cal)
    }

    #[test]
    fn test_open_checks_identity() {
        let mut mag = driver(device(400, 400, 400), Some(CALIBRATED));
        assert_eq!(mag.open(), Ok(()));

        let mut wrong = RegisterI2c::new(ADDRESS);
        wrong.load(reg::ID_A, b"X43");
        assert_eq!(driver(wrong, Some(CALIBRATED)).open(), Err(FailureReason::NoDevice));
    }

    #[test]
    fn test_open_without_device() {
        let absent = RegisterI2c::new(0x50);
        assert_eq!(driver(absent, Some(CALIBRATED)).open(), Err(FailureReason::NoDevice));
    }

    #[test]
    fn test_self_test_passes_within_limits() {
        let mut mag = driver(device(243, 575, 400), Some(CALIBRATED));
        assert_eq!(mag.self_test(), Ok(()));
        assert_eq!(mag.i2c.last_write(reg::CONFIG_A), Some(CONFIG_A_POSITIVE_BIAS));
        assert_eq!(mag.i2c.last_write(reg::CONFIG_B), Some(CONFIG_B_SELF_TEST));
        // Two conversions waited for
        assert_eq!(mag.delay.total_ns, 2 * SAMPLE_PERIOD_MS as u64 * 1_000_000);
    }

    #[test]
    fn test_self_test_fails_out_of_limits() {
        let mut mag = driver(device(400, 242, 400), Some(CALIBRATED));
        assert_eq!(mag.self_test(), Err(FailureReason::SelfTestFailed));

        let mut mag = driver(device(400, 400, 576), Some(CALIBRATED));
        assert_eq!(mag.self_test(), Err(FailureReason::SelfTestFailed));
    }

    #[test]
    fn test_missing_calibration_checked_first() {
        let mut mag = driver(device(400, 400, 400), None);
        assert_eq!(mag.self_test(), Err(FailureReason::CalibrationMissing));
        assert!(mag.i2c.writes.is_empty());

        let bad = MagCalibration {
            scale: [1.0, 0.0, 1.0],
            ..CALIBRATED
        };
        let mut mag = driver(device(400, 400, 400), Some(bad));
        assert_eq!(mag.self_test(), Err(FailureReason::CalibrationMissing));
    }

    #[test]
    fn test_bus_error_during_self_test() {
        let mut bus = device(400, 400, 400);
        bus.fail_after(2);
        let mut mag = driver(bus, Some(CALIBRATED));
        assert_eq!(mag.self_test(), Err(FailureReason::Bus));
    }

    #[test]
    fn test_release_restores_normal_configuration() {
        let mut mag = driver(device(400, 400, 400), Some(CALIBRATED));
        mag.self_test().unwrap();
        mag.release();

        assert_eq!(mag.i2c.regs[reg::CONFIG_A as usize], CONFIG_A_NORMAL);
        assert_eq!(mag.i2c.regs[reg::CONFIG_B as usize], CONFIG_B_NORMAL);
    }

    #[test]
    fn test_calibration_from_params() {
        let mut params = ParamTable::new();
        assert_eq!(MagCalibration::from_params(&params), None);

        for (name, value) in [
            ("CAL_MAG_X_OFF", 12.0),
            ("CAL_MAG_Y_OFF", -4.0),
            ("CAL_MAG_Z_OFF", 30.0),
            ("CAL_MAG_X_SCALE", 1.02),
            ("CAL_MAG_Y_SCALE", 0.98),
        ] {
            params.set(name, value).unwrap();
        }
        assert_eq!(MagCalibration::from_params(&params), None);

        params.set("CAL_MAG_Z_SCALE", 1.0).unwrap();
        assert_eq!(MagCalibration::from_params(&params), Some(CALIBRATED));
    }

    proptest! {
        #[test]
        fn prop_any_axis_out_of_limits_fails(
            axis in 0usize..3,
            reading in prop_oneof![i16::MIN..243i16, 576i16..=i16::MAX],
        ) {
            let mut sample = [400i16; 3];
            sample[axis] = reading;
            let mut mag = driver(device(sample[0], sample[1], sample[2]), Some(CALIBRATED));
            prop_assert_eq!(mag.self_test(), Err(FailureReason::SelfTestFailed));
        }
    }
}
