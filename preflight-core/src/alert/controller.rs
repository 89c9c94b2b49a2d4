//! Alert controller
//!
//! Owns the alert state and the LED phase, and drives the indicator
//! outputs while the alert plays.

use embedded_hal::delay::DelayNs;

use super::state::{AlertEvent, AlertState};
use crate::config::AlertConfig;
use crate::traits::{AlarmPattern, LedId, StatusLeds, StatusLog, ToneAlarm};
use crate::verdict::{ExitStatus, FailurePolicy, SystemVerdict};

/// Commanded state of the two status LEDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LedPhases {
    pub blue: bool,
    pub amber: bool,
}

impl LedPhases {
    pub fn get(&self, led: LedId) -> bool {
        match led {
            LedId::Blue => self.blue,
            LedId::Amber => self.amber,
        }
    }

    /// Both off, then blue on: the LEDs blink in opposite phase from here
    pub fn start_alternating(&mut self) {
        self.blue = true;
        self.amber = false;
    }

    pub fn toggle_both(&mut self) {
        self.blue = !self.blue;
        self.amber = !self.amber;
    }

    pub fn all_on(&mut self) {
        self.blue = true;
        self.amber = true;
    }
}

/// Scoped ownership of the alarm and the LEDs
///
/// Both outputs are released when the guard goes out of scope.
struct Indicators<'a, Ld: StatusLeds + ?Sized, A: ToneAlarm + ?Sized> {
    leds: &'a mut Ld,
    alarm: &'a mut A,
}

impl<'a, Ld: StatusLeds + ?Sized, A: ToneAlarm + ?Sized> Indicators<'a, Ld, A> {
    fn acquire(leds: &'a mut Ld, alarm: &'a mut A) -> Self {
        Self { leds, alarm }
    }

    fn all_off(&mut self) {
        for led in LedId::ALL {
            self.leds.set(led, false);
        }
    }

    fn show(&mut self, phases: &LedPhases) {
        for led in LedId::ALL {
            self.leds.set(led, phases.get(led));
        }
    }
}

impl<Ld: StatusLeds + ?Sized, A: ToneAlarm + ?Sized> Drop for Indicators<'_, Ld, A> {
    fn drop(&mut self) {
        self.alarm.release();
        self.leds.release();
    }
}

/// Failure alert controller
pub struct AlertController {
    config: AlertConfig,
    policy: FailurePolicy,
    state: AlertState,
    phases: LedPhases,
}

impl AlertController {
    pub fn new(config: AlertConfig, policy: FailurePolicy) -> Self {
        Self {
            config,
            policy,
            state: AlertState::Idle,
            phases: LedPhases::default(),
        }
    }

    pub fn state(&self) -> AlertState {
        self.state
    }

    pub fn phases(&self) -> LedPhases {
        self.phases
    }

    /// Alarm pattern started on a given cycle, if any
    pub fn pattern_for_cycle(&self, cycle: u16) -> Option<AlarmPattern> {
        let every = |n: u16| cycle.checked_rem(n) == Some(0);
        if every(self.config.major_every) {
            Some(AlarmPattern::Major)
        } else if every(self.config.minor_every) {
            Some(AlarmPattern::Minor)
        } else {
            None
        }
    }

    fn advance(&mut self, event: AlertEvent) {
        self.state = self.state.transition(event, &self.config, self.policy);
    }

    /// Run the alert for a verdict and return the exit status
    ///
    /// A healthy verdict returns at once without touching any output.
    /// Blocks for the whole alert otherwise.
    pub fn conclude<Ld, A, L, D>(
        &mut self,
        verdict: SystemVerdict,
        leds: &mut Ld,
        alarm: &mut A,
        log: &mut L,
        delay: &mut D,
    ) -> ExitStatus
    where
        Ld: StatusLeds + ?Sized,
        A: ToneAlarm + ?Sized,
        L: StatusLog + ?Sized,
        D: DelayNs + ?Sized,
    {
        self.advance(AlertEvent::Verdict(verdict));
        if let AlertState::Terminated(status) = self.state {
            return status;
        }

        #[cfg(feature = "defmt")]
        defmt::warn!(
            "preflight failed: {}, alerting for {} ms",
            verdict,
            self.config.duration_ms()
        );

        log.flush();

        let mut outputs = Indicators::acquire(leds, alarm);
        outputs.all_off();
        self.phases.start_alternating();
        outputs.show(&self.phases);

        while let AlertState::Alerting { cycle } = self.state {
            self.phases.toggle_both();
            outputs.show(&self.phases);
            if let Some(pattern) = self.pattern_for_cycle(cycle) {
                outputs.alarm.play(pattern);
            }
            delay.delay_ms(self.config.cycle_ms);
            self.advance(AlertEvent::CycleElapsed);
        }

        outputs.alarm.silence();
        self.phases.all_on();
        outputs.show(&self.phases);

        match self.state {
            AlertState::Terminated(status) => status,
            _ => self.policy.exit_status(&verdict),
        }
    }
}
