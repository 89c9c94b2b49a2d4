//! PWM buzzer
//!
//! A passive piezo on a PWM output. The carrier frequency is fixed by the
//! PWM slice configuration; patterns differ in loudness. A pattern keeps
//! sounding until it is replaced or silenced.

use embedded_hal::pwm::SetDutyCycle;
use preflight_core::traits::{AlarmPattern, ToneAlarm};

/// Duty cycle for the major pattern
pub const MAJOR_DUTY_PERCENT: u8 = 50;
/// Duty cycle for the minor pattern
pub const MINOR_DUTY_PERCENT: u8 = 25;

/// Buzzer driven by a PWM channel
pub struct PwmBuzzer<P> {
    pwm: P,
    playing: Option<AlarmPattern>,
}

impl<P: SetDutyCycle> PwmBuzzer<P> {
    /// Take the channel and make sure it is quiet
    pub fn new(pwm: P) -> Self {
        let mut buzzer = Self { pwm, playing: None };
        buzzer.silence();
        buzzer
    }

    pub fn playing(&self) -> Option<AlarmPattern> {
        self.playing
    }

    pub const fn duty_percent(pattern: AlarmPattern) -> u8 {
        match pattern {
            AlarmPattern::Major => MAJOR_DUTY_PERCENT,
            AlarmPattern::Minor => MINOR_DUTY_PERCENT,
        }
    }
}

impl<P: SetDutyCycle> ToneAlarm for PwmBuzzer<P> {
    fn play(&mut self, pattern: AlarmPattern) {
        if self.pwm.set_duty_cycle_percent(Self::duty_percent(pattern)).is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("buzzer: failed to start pattern {}", pattern.tune_id());
            return;
        }
        self.playing = Some(pattern);
    }

    fn silence(&mut self) {
        if self.pwm.set_duty_cycle_fully_off().is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("buzzer: failed to silence");
        }
        self.playing = None;
    }

    fn release(&mut self) {
        self.silence();
    }
}
