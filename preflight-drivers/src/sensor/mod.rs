//! Sensor self-test drivers

pub mod hmc5883;
pub mod icm42688;
pub mod spl06;

pub use hmc5883::{Hmc5883, MagCalibration};
pub use icm42688::Icm42688;
pub use spl06::Spl06;

use preflight_core::traits::{FailureReason, SelfTest, SensorKind, SensorSuite};

/// Self-test capability of a combined accelerometer and gyroscope
///
/// `open` and `release` are called once per sensor kind, so a six-axis
/// part is opened twice during a full sequence.
pub trait InertialSelfTest {
    fn open(&mut self) -> Result<(), FailureReason>;

    fn accel_self_test(&mut self) -> Result<(), FailureReason>;

    fn gyro_self_test(&mut self) -> Result<(), FailureReason>;

    fn release(&mut self) {}
}

/// The sensors fitted to a board
///
/// A slot left empty reports [`FailureReason::NoDevice`] when opened.
pub struct BoardSensors<M, I, B> {
    pub mag: Option<M>,
    pub imu: Option<I>,
    pub baro: Option<B>,
}

impl<M, I, B> BoardSensors<M, I, B> {
    pub fn new(mag: Option<M>, imu: Option<I>, baro: Option<B>) -> Self {
        Self { mag, imu, baro }
    }
}

impl<M, I, B> SensorSuite for BoardSensors<M, I, B>
where
    M: SelfTest,
    I: InertialSelfTest,
    B: SelfTest,
{
    fn open(&mut self, kind: SensorKind) -> Result<(), FailureReason> {
        match kind {
            SensorKind::Magnetometer => self.mag.as_mut().map_or(Err(FailureReason::NoDevice), SelfTest::open),
            SensorKind::Accelerometer | SensorKind::Gyroscope => self
                .imu
                .as_mut()
                .map_or(Err(FailureReason::NoDevice), InertialSelfTest::open),
            SensorKind::Barometer => self.baro.as_mut().map_or(Err(FailureReason::NoDevice), SelfTest::open),
        }
    }

    fn self_test(&mut self, kind: SensorKind) -> Result<(), FailureReason> {
        match (kind, &mut self.mag, &mut self.imu, &mut self.baro) {
            (SensorKind::Magnetometer, Some(mag), _, _) => mag.self_test(),
            (SensorKind::Accelerometer, _, Some(imu), _) => imu.accel_self_test(),
            (SensorKind::Gyroscope, _, Some(imu), _) => imu.gyro_self_test(),
            (SensorKind::Barometer, _, _, Some(baro)) => baro.self_test(),
            _ => Err(FailureReason::NoDevice),
        }
    }

    fn release(&mut self, kind: SensorKind) {
        match kind {
            SensorKind::Magnetometer => self.mag.as_mut().map_or((), SelfTest::release),
            SensorKind::Accelerometer | SensorKind::Gyroscope => {
                self.imu.as_mut().map_or((), InertialSelfTest::release)
            }
            SensorKind::Barometer => self.baro.as_mut().map_or((), SelfTest::release),
        }
    }
}
