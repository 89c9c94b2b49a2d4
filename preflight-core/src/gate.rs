//! Boot gate orchestration
//!
//! One run of the gate: parse the arguments, wait for sensor sampling to
//! settle, run the sensor sequence, validate the RC calibration and hand
//! the verdict to the alert controller.

use embedded_hal::delay::DelayNs;

use crate::alert::AlertController;
use crate::calibration::{validate_rc_channels, RcReport};
use crate::cli::{parse_args, USAGE};
use crate::config::PreflightConfig;
use crate::report::Reporter;
use crate::sequencer::{run_sensor_checks, SensorReport};
use crate::traits::{ParamStore, SensorSuite, StatusLeds, StatusLog, ToneAlarm};
use crate::verdict::{ExitStatus, SystemVerdict};

/// Everything the gate touches during a run
pub struct BootDevices<'a, S: ?Sized, P: ?Sized, L: ?Sized, Ld: ?Sized, A: ?Sized, D: ?Sized> {
    pub sensors: &'a mut S,
    pub params: &'a P,
    pub log: &'a mut L,
    pub leds: &'a mut Ld,
    pub alarm: &'a mut A,
    pub delay: &'a mut D,
}

/// Outcome of the checks, before any alerting
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Evaluation {
    pub sensors: SensorReport,
    /// `None` when a sensor failure skipped the RC check
    pub rc: Option<RcReport>,
    /// Critical messages sent
    pub messages: u16,
}

impl Evaluation {
    pub fn verdict(&self) -> SystemVerdict {
        SystemVerdict {
            sensor_ok: self.sensors.is_ok(),
            rc_ok: self.rc.as_ref().map_or(true, RcReport::is_ok),
        }
    }
}

/// Run all checks and collect their results
///
/// The RC calibration is only validated once every sensor has passed, so
/// a sensor failure yields exactly one critical message.
pub fn evaluate<S, P, L, D>(
    config: &PreflightConfig,
    sensors: &mut S,
    params: &P,
    log: &mut L,
    delay: &mut D,
) -> Evaluation
where
    S: SensorSuite + ?Sized,
    P: ParamStore + ?Sized,
    L: StatusLog + ?Sized,
    D: DelayNs + ?Sized,
{
    delay.delay_ms(config.timing.settle_ms);

    let mut reporter = Reporter::new(log, delay, config.timing.message_gap_ms);
    let sensor_report = run_sensor_checks(sensors, &mut reporter);

    let rc = if sensor_report.is_ok() {
        Some(validate_rc_channels(params, &config.channels, &mut reporter))
    } else {
        #[cfg(feature = "defmt")]
        defmt::info!("sensor failure, RC calibration not checked");
        None
    };

    Evaluation {
        sensors: sensor_report,
        rc,
        messages: reporter.sent(),
    }
}

/// Full gate run, from arguments to exit status
pub fn run_preflight<'a, I, S, P, L, Ld, A, D>(
    args: I,
    config: &PreflightConfig,
    devices: BootDevices<'_, S, P, L, Ld, A, D>,
) -> ExitStatus
where
    I: IntoIterator<Item = &'a str>,
    S: SensorSuite + ?Sized,
    P: ParamStore + ?Sized,
    L: StatusLog + ?Sized,
    Ld: StatusLeds + ?Sized,
    A: ToneAlarm + ?Sized,
    D: DelayNs + ?Sized,
{
    let BootDevices {
        sensors,
        params,
        log,
        leds,
        alarm,
        delay,
    } = devices;

    let policy = match parse_args(args) {
        Ok(policy) => policy,
        Err(_) => {
            log.console(USAGE);
            return ExitStatus::Failure;
        }
    };

    let evaluation = evaluate(config, sensors, params, log, delay);
    let verdict = evaluation.verdict();

    #[cfg(feature = "defmt")]
    defmt::info!("preflight verdict: {}", verdict);

    AlertController::new(config.alert, policy).conclude(verdict, leds, alarm, log, delay)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MapParams, MockAlarm, MockLeds, MockSuite, RecordingDelay, RecordingLog};
    use crate::traits::{FailureReason, SensorKind};

    struct Bench {
        sensors: MockSuite,
        params: MapParams,
        log: RecordingLog,
        leds: MockLeds,
        alarm: MockAlarm,
        delay: RecordingDelay,
    }

    impl Bench {
        fn healthy() -> Self {
            Self {
                sensors: MockSuite::healthy(),
                params: MapParams::nominal(12),
                log: RecordingLog::default(),
                leds: MockLeds::default(),
                alarm: MockAlarm::default(),
                delay: RecordingDelay::default(),
            }
        }

        fn run(&mut self, args: &[&str], config: &PreflightConfig) -> ExitStatus {
            run_preflight(
                args.iter().copied(),
                config,
                BootDevices {
                    sensors: &mut self.sensors,
                    params: &self.params,
                    log: &mut self.log,
                    leds: &mut self.leds,
                    alarm: &mut self.alarm,
                    delay: &mut self.delay,
                },
            )
        }
    }

    /// Shortened alert so tests stay readable
    fn test_config() -> PreflightConfig {
        let mut config = PreflightConfig::new();
        config.alert.cycles = 10;
        config
    }

    #[test]
    fn test_healthy_system_passes_silently() {
        let mut bench = Bench::healthy();
        let status = bench.run(&["--fail-on-error"], &PreflightConfig::new());

        assert_eq!(status, ExitStatus::Success);
        assert!(bench.log.critical.is_empty());
        assert!(bench.alarm.events.is_empty());
        assert!(bench.leds.history.is_empty());
        // Only the settle wait
        assert_eq!(bench.delay.calls, [150]);
    }

    #[test]
    fn test_magnetometer_failure_alerts_and_skips_rc() {
        for (args, expected) in [
            (&[][..], ExitStatus::Success),
            (&["--fail-on-error"][..], ExitStatus::Failure),
        ] {
            let mut bench = Bench::healthy();
            bench
                .sensors
                .fail_test(SensorKind::Magnetometer, FailureReason::SelfTestFailed);
            // Broken calibration must not produce messages here
            bench.params.set("RC1_MIN", 0.0);

            let status = bench.run(args, &test_config());

            assert_eq!(status, expected);
            assert_eq!(bench.log.critical, ["SENSOR FAIL: MAG CHECK/CAL"]);
            assert_eq!(bench.sensors.opened, [SensorKind::Magnetometer]);
            assert_eq!(bench.alarm.events.last(), Some(&crate::mock::AlarmEvent::Silence));
            // settle + one message gap + ten alert cycles
            assert_eq!(bench.delay.calls.len(), 1 + 1 + 10);
        }
    }

    #[test]
    fn test_rc_failure_alerts() {
        let mut bench = Bench::healthy();
        bench.params.set("RC9_DZ", 800.0);

        let status = bench.run(&["--fail-on-error"], &test_config());

        assert_eq!(status, ExitStatus::Failure);
        assert_eq!(
            bench.log.critical,
            ["ERR: RC_9_DZ > 500", "ERROR: 1 config error(s) for RC channel 9."]
        );
        assert_eq!(bench.sensors.tested, SensorKind::CHECK_ORDER);
        assert_eq!(bench.leds.released, 1);
    }

    #[test]
    fn test_help_exits_without_checks() {
        let mut bench = Bench::healthy();
        let status = bench.run(&["--help"], &PreflightConfig::new());

        assert_eq!(status, ExitStatus::Failure);
        assert_eq!(bench.log.console, [USAGE]);
        assert!(bench.sensors.opened.is_empty());
        assert!(bench.delay.calls.is_empty());
    }

    #[test]
    fn test_unknown_argument_exits_with_usage() {
        let mut bench = Bench::healthy();
        let status = bench.run(&["--verbose"], &PreflightConfig::new());

        assert_eq!(status, ExitStatus::Failure);
        assert_eq!(bench.log.console, [USAGE]);
        assert!(bench.sensors.opened.is_empty());
    }

    #[test]
    fn test_evaluation_verdict() {
        let mut bench = Bench::healthy();
        bench.sensors.fail_open(SensorKind::Barometer);
        let evaluation = evaluate(
            &PreflightConfig::new(),
            &mut bench.sensors,
            &bench.params,
            &mut bench.log,
            &mut bench.delay,
        );

        assert_eq!(evaluation.rc, None);
        assert_eq!(evaluation.messages, 1);
        assert_eq!(
            evaluation.verdict(),
            SystemVerdict {
                sensor_ok: false,
                rc_ok: true
            }
        );
    }
}
