//! Error taxonomy of the gate
//!
//! Sensor and calibration errors never abort the run: they are folded into
//! the [`SystemVerdict`](crate::verdict::SystemVerdict) and surface as
//! critical messages. Their `Display` output is that message text.

use core::fmt;

use crate::calibration::Invariant;
use crate::traits::{FailureReason, SensorKind};

/// A sensor that did not pass its self-test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SelfTestFailure {
    pub kind: SensorKind,
    pub reason: FailureReason,
}

impl fmt::Display for SelfTestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = self.kind.tag();
        match self.reason {
            FailureReason::NoDevice => write!(f, "SENSOR FAIL: NO {}", tag),
            FailureReason::CalibrationMissing => write!(f, "SENSOR FAIL: {} CAL MISSING", tag),
            FailureReason::SelfTestFailed => write!(f, "SENSOR FAIL: {} CHECK/CAL", tag),
            FailureReason::Bus => write!(f, "SENSOR FAIL: {} BUS ERROR", tag),
        }
    }
}

impl FailureReason {
    /// Console hint for the operator
    pub const fn hint(self) -> &'static str {
        match self {
            FailureReason::NoDevice => "failed to open - is the driver started?",
            FailureReason::CalibrationMissing => "calibration missing or bad - calibrate first",
            FailureReason::SelfTestFailed => "self test failed",
            FailureReason::Bus => "bus error during self test - check wiring",
        }
    }
}

/// One calibration invariant broken on one channel
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvariantViolation {
    /// Channel number (1-based)
    pub channel: u8,
    pub invariant: Invariant,
    /// Configured floor/ceiling for range invariants, unused for trim ordering
    pub bound: f32,
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ch = self.channel;
        match self.invariant {
            Invariant::MinFloor => write!(f, "ERR: RC_{}_MIN < {}", ch, self.bound),
            Invariant::MaxCeiling => write!(f, "ERR: RC_{}_MAX > {}", ch, self.bound),
            Invariant::TrimAboveMin => write!(f, "ERR: RC_{}_TRIM < MIN", ch),
            Invariant::TrimBelowMax => write!(f, "ERR: RC_{}_TRIM > MAX", ch),
            Invariant::DeadzoneCeiling => write!(f, "ERR: RC_{}_DZ > {}", ch, self.bound),
        }
    }
}

/// Command line could not be turned into a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UsageError {
    /// `--help` was given
    HelpRequested,
    /// Argument not understood
    UnknownArgument,
}

impl fmt::Display for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(crate::cli::USAGE)
    }
}
