//! ICM-42688-P six-axis IMU (SPI)
//!
//! Provides the accelerometer and gyroscope self-tests. Both follow the
//! same procedure: average a block of samples, enable the internal
//! self-test actuation for all three axes, average again and compare the
//! per-axis difference against the accepted response.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;
use preflight_core::traits::FailureReason;

use super::InertialSelfTest;

/// Expected `WHO_AM_I` value
pub const WHO_AM_I_VALUE: u8 = 0x47;

/// ICM-42688 register addresses (bank 0)
pub mod reg {
    pub const DEVICE_CONFIG: u8 = 0x11;
    /// First accelerometer data register (X high byte)
    pub const ACCEL_DATA_X1: u8 = 0x1F;
    /// First gyroscope data register (X high byte)
    pub const GYRO_DATA_X1: u8 = 0x25;
    pub const PWR_MGMT0: u8 = 0x4E;
    pub const GYRO_CONFIG0: u8 = 0x4F;
    pub const ACCEL_CONFIG0: u8 = 0x50;
    /// Self-test actuation enables
    pub const SELF_TEST_CONFIG: u8 = 0x70;
    pub const WHO_AM_I: u8 = 0x75;
}

/// `SELF_TEST_CONFIG` bits
pub mod st {
    pub const EN_GYRO_XYZ: u8 = 0x07;
    pub const EN_ACCEL_XYZ: u8 = 0x38;
    pub const ACCEL_ST_POWER: u8 = 0x40;
}

const READ: u8 = 0x80;

/// Accelerometer and gyroscope in low-noise mode
const PWR_ACCEL_GYRO_LN: u8 = 0x0F;
/// ±250 dps, 1 kHz
const GYRO_CONFIG_SELF_TEST: u8 = 0x66;
/// ±4 g, 1 kHz
const ACCEL_CONFIG_SELF_TEST: u8 = 0x46;

pub const ACCEL_LSB_PER_G: i32 = 8192;
pub const GYRO_LSB_PER_DPS: i32 = 131;

/// Accepted accelerometer self-test response (mg)
pub const ACCEL_RESPONSE_MG: core::ops::RangeInclusive<i32> = 225..=675;
/// Minimum gyroscope self-test response (dps)
pub const GYRO_RESPONSE_MIN_DPS: i32 = 60;

/// Samples averaged per measurement block
const SAMPLES: i32 = 8;
const STARTUP_MS: u32 = 50;
const SELF_TEST_SETTLE_MS: u32 = 100;
const SAMPLE_PERIOD_MS: u32 = 1;

/// Bus errors of the SPI transfer or the chip-select pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<S, P> {
    Spi(S),
    Pin(P),
}

/// ICM-42688 driver over a dedicated SPI bus and chip-select pin
pub struct Icm42688<SPI, CS, D> {
    spi: SPI,
    cs: CS,
    delay: D,
}

type Result<T, SPI, CS> = core::result::Result<
    T,
    Error<<SPI as embedded_hal::spi::ErrorType>::Error, <CS as embedded_hal::digital::ErrorType>::Error>,
>;

impl<SPI, CS, D> Icm42688<SPI, CS, D>
where
    SPI: SpiBus,
    CS: OutputPin,
    D: DelayNs,
{
    pub fn new(spi: SPI, cs: CS, delay: D) -> Self {
        Self { spi, cs, delay }
    }

    fn selected<R>(
        &mut self,
        f: impl FnOnce(&mut SPI) -> core::result::Result<R, SPI::Error>,
    ) -> Result<R, SPI, CS> {
        self.cs.set_low().map_err(Error::Pin)?;
        let result = f(&mut self.spi).and_then(|r| self.spi.flush().map(|()| r));
        self.cs.set_high().map_err(Error::Pin)?;
        result.map_err(Error::Spi)
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), SPI, CS> {
        self.selected(|spi| spi.write(&[reg & !READ, value]))
    }

    fn read_regs(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), SPI, CS> {
        self.selected(|spi| {
            spi.write(&[reg | READ])?;
            spi.read(buf)
        })
    }

    pub fn who_am_i(&mut self) -> Result<u8, SPI, CS> {
        let mut id = [0u8];
        self.read_regs(reg::WHO_AM_I, &mut id)?;
        Ok(id[0])
    }

    fn read_vector(&mut self, first: u8) -> Result<[i16; 3], SPI, CS> {
        let mut data = [0u8; 6];
        self.read_regs(first, &mut data)?;
        Ok([
            i16::from_be_bytes([data[0], data[1]]),
            i16::from_be_bytes([data[2], data[3]]),
            i16::from_be_bytes([data[4], data[5]]),
        ])
    }

    fn average(&mut self, first: u8) -> Result<[i32; 3], SPI, CS> {
        let mut sum = [0i32; 3];
        for _ in 0..SAMPLES {
            let v = self.read_vector(first)?;
            for axis in 0..3 {
                sum[axis] += v[axis] as i32;
            }
            self.delay.delay_ms(SAMPLE_PERIOD_MS);
        }
        Ok(sum.map(|s| s / SAMPLES))
    }

    /// Per-axis change in raw output when the given actuation is enabled
    fn self_test_response(&mut self, data: u8, enable: u8) -> Result<[i32; 3], SPI, CS> {
        let normal = self.average(data)?;
        self.write_reg(reg::SELF_TEST_CONFIG, enable)?;
        self.delay.delay_ms(SELF_TEST_SETTLE_MS);
        let actuated = self.average(data)?;

        let mut response = [0i32; 3];
        for axis in 0..3 {
            response[axis] = (actuated[axis] - normal[axis]).abs();
        }
        Ok(response)
    }

    fn configure(&mut self) -> Result<(), SPI, CS> {
        self.write_reg(reg::GYRO_CONFIG0, GYRO_CONFIG_SELF_TEST)?;
        self.write_reg(reg::ACCEL_CONFIG0, ACCEL_CONFIG_SELF_TEST)?;
        self.write_reg(reg::PWR_MGMT0, PWR_ACCEL_GYRO_LN)?;
        self.delay.delay_ms(STARTUP_MS);
        Ok(())
    }
}

impl<SPI, CS, D> InertialSelfTest for Icm42688<SPI, CS, D>
where
    SPI: SpiBus,
    CS: OutputPin,
    D: DelayNs,
{
    fn open(&mut self) -> core::result::Result<(), FailureReason> {
        match self.who_am_i() {
            Ok(WHO_AM_I_VALUE) => {}
            Ok(_id) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("icm42688: unexpected WHO_AM_I {=u8:#x}", _id);
                return Err(FailureReason::NoDevice);
            }
            Err(_) => return Err(FailureReason::NoDevice),
        }
        self.configure().map_err(|_| FailureReason::Bus)
    }

    fn accel_self_test(&mut self) -> core::result::Result<(), FailureReason> {
        let response = self
            .self_test_response(reg::ACCEL_DATA_X1, st::ACCEL_ST_POWER | st::EN_ACCEL_XYZ)
            .map_err(|_| FailureReason::Bus)?;
        let mg = response.map(|lsb| lsb * 1000 / ACCEL_LSB_PER_G);

        if mg.iter().all(|r| ACCEL_RESPONSE_MG.contains(r)) {
            Ok(())
        } else {
            #[cfg(feature = "defmt")]
            defmt::warn!("icm42688: accel self-test response {} mg", mg);
            Err(FailureReason::SelfTestFailed)
        }
    }

    fn gyro_self_test(&mut self) -> core::result::Result<(), FailureReason> {
        let response = self
            .self_test_response(reg::GYRO_DATA_X1, st::EN_GYRO_XYZ)
            .map_err(|_| FailureReason::Bus)?;
        let dps = response.map(|lsb| lsb / GYRO_LSB_PER_DPS);

        if dps.iter().all(|&r| r >= GYRO_RESPONSE_MIN_DPS) {
            Ok(())
        } else {
            #[cfg(feature = "defmt")]
            defmt::warn!("icm42688: gyro self-test response {} dps", dps);
            Err(FailureReason::SelfTestFailed)
        }
    }

    fn release(&mut self) {
        if self.write_reg(reg::SELF_TEST_CONFIG, 0).is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("icm42688: failed to clear self-test configuration");
        }
    }
}
