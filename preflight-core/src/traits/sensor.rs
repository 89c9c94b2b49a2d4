//! Sensor self-test capability

/// Sensor kinds covered by the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorKind {
    Magnetometer,
    Accelerometer,
    Gyroscope,
    Barometer,
}

impl SensorKind {
    /// Fixed priority order of the sequencer
    pub const CHECK_ORDER: [SensorKind; 4] = [
        SensorKind::Magnetometer,
        SensorKind::Accelerometer,
        SensorKind::Gyroscope,
        SensorKind::Barometer,
    ];

    /// Short upper-case tag used in critical messages
    pub const fn tag(self) -> &'static str {
        match self {
            SensorKind::Magnetometer => "MAG",
            SensorKind::Accelerometer => "ACCEL",
            SensorKind::Gyroscope => "GYRO",
            SensorKind::Barometer => "BARO",
        }
    }

    /// Human readable name
    pub const fn name(self) -> &'static str {
        match self {
            SensorKind::Magnetometer => "magnetometer",
            SensorKind::Accelerometer => "accelerometer",
            SensorKind::Gyroscope => "gyroscope",
            SensorKind::Barometer => "barometer",
        }
    }

    /// Position in [`Self::CHECK_ORDER`]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Why a sensor did not pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FailureReason {
    /// Device could not be opened (absent, wrong identity)
    NoDevice,
    /// Driver has no usable calibration
    CalibrationMissing,
    /// Built-in self-test response out of limits
    SelfTestFailed,
    /// Bus transaction failed during the test
    Bus,
}

/// Self-test capability of a single sensor driver
///
/// `open` acquires the device, `release` returns it to normal operation.
/// Callers pair them through a scoped guard, so `release` runs on every
/// path after a successful `open`.
pub trait SelfTest {
    /// Acquire the device and verify its identity
    fn open(&mut self) -> Result<(), FailureReason>;

    /// Run the built-in self-test
    fn self_test(&mut self) -> Result<(), FailureReason>;

    /// Return the device to its normal configuration
    fn release(&mut self) {}
}

/// Collection of all sensors the gate checks, addressed by kind
///
/// Implemented by board support code; a kind without a fitted driver
/// reports [`FailureReason::NoDevice`] from `open`.
pub trait SensorSuite {
    fn open(&mut self, kind: SensorKind) -> Result<(), FailureReason>;

    fn self_test(&mut self, kind: SensorKind) -> Result<(), FailureReason>;

    fn release(&mut self, kind: SensorKind);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_order_indices() {
        for (i, kind) in SensorKind::CHECK_ORDER.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn test_tags_are_distinct() {
        let tags = SensorKind::CHECK_ORDER.map(SensorKind::tag);
        for (i, a) in tags.iter().enumerate() {
            for b in &tags[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
