//! Sensor self-test sequencer
//!
//! Checks the sensors in a fixed priority order and stops at the first
//! failure: once flight-critical sensing is known to be unsafe there is
//! nothing to gain from probing further hardware.

use embedded_hal::delay::DelayNs;

use crate::error::SelfTestFailure;
use crate::report::Reporter;
use crate::traits::{FailureReason, SensorKind, SensorSuite, StatusLog};

/// Outcome of one sensor check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SelfTestResult {
    Pass,
    Fail(FailureReason),
    /// Skipped because an earlier sensor failed
    NotRun,
}

impl SelfTestResult {
    pub fn is_fail(&self) -> bool {
        matches!(self, SelfTestResult::Fail(_))
    }
}

/// Results of a sequencer run, indexed by sensor kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorReport {
    results: [SelfTestResult; SensorKind::CHECK_ORDER.len()],
}

impl Default for SensorReport {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorReport {
    /// Report with nothing run yet
    pub const fn new() -> Self {
        Self {
            results: [SelfTestResult::NotRun; SensorKind::CHECK_ORDER.len()],
        }
    }

    pub fn result(&self, kind: SensorKind) -> SelfTestResult {
        self.results[kind.index()]
    }

    /// The failure that stopped the sequence, if any
    pub fn first_failure(&self) -> Option<SelfTestFailure> {
        self.iter().find_map(|(kind, result)| match result {
            SelfTestResult::Fail(reason) => Some(SelfTestFailure { kind, reason }),
            _ => None,
        })
    }

    /// True when no sensor failed
    pub fn is_ok(&self) -> bool {
        !self.results.iter().any(SelfTestResult::is_fail)
    }

    /// Results in check order
    pub fn iter(&self) -> impl Iterator<Item = (SensorKind, SelfTestResult)> + '_ {
        SensorKind::CHECK_ORDER
            .iter()
            .map(move |&kind| (kind, self.result(kind)))
    }
}

/// Exclusive handle on one sensor, released when dropped
struct SensorHandle<'a, S: SensorSuite + ?Sized> {
    suite: &'a mut S,
    kind: SensorKind,
}

impl<'a, S: SensorSuite + ?Sized> SensorHandle<'a, S> {
    fn acquire(suite: &'a mut S, kind: SensorKind) -> Result<Self, FailureReason> {
        suite.open(kind)?;
        Ok(Self { suite, kind })
    }

    fn self_test(&mut self) -> Result<(), FailureReason> {
        self.suite.self_test(self.kind)
    }
}

impl<S: SensorSuite + ?Sized> Drop for SensorHandle<'_, S> {
    fn drop(&mut self) {
        self.suite.release(self.kind);
    }
}

/// Open, test and release a single sensor
pub fn check_sensor<S: SensorSuite + ?Sized>(suite: &mut S, kind: SensorKind) -> SelfTestResult {
    let mut handle = match SensorHandle::acquire(suite, kind) {
        Ok(handle) => handle,
        Err(reason) => return SelfTestResult::Fail(reason),
    };

    match handle.self_test() {
        Ok(()) => SelfTestResult::Pass,
        Err(reason) => SelfTestResult::Fail(reason),
    }
}

/// Run the self-test sequence
///
/// A failing sensor produces exactly one critical message and ends the
/// sequence; the remaining kinds stay [`SelfTestResult::NotRun`].
pub fn run_sensor_checks<S, L, D>(suite: &mut S, reporter: &mut Reporter<'_, L, D>) -> SensorReport
where
    S: SensorSuite + ?Sized,
    L: StatusLog + ?Sized,
    D: DelayNs + ?Sized,
{
    let mut report = SensorReport::new();

    for kind in SensorKind::CHECK_ORDER {
        let result = check_sensor(suite, kind);
        report.results[kind.index()] = result;

        if let SelfTestResult::Fail(reason) = result {
            #[cfg(feature = "defmt")]
            defmt::warn!("{} check failed: {}", kind.name(), reason);

            reporter.console(format_args!("{}: {}", kind.name(), reason.hint()));
            reporter.critical(SelfTestFailure { kind, reason });
            break;
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("{} self test passed", kind.name());
    }

    report
}
