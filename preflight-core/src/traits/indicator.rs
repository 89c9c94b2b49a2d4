//! Status LED and buzzer outputs

/// Status LEDs driven by the alert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedId {
    Blue,
    Amber,
}

impl LedId {
    pub const ALL: [LedId; 2] = [LedId::Blue, LedId::Amber];

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Alarm patterns played during the alert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmPattern {
    /// Pattern "A", marks the long cadence
    Major,
    /// Pattern "B", marks the half cadence
    Minor,
}

impl AlarmPattern {
    /// Tune number understood by tone alarm drivers (0 is silence)
    pub const fn tune_id(self) -> u8 {
        match self {
            AlarmPattern::Major => 4,
            AlarmPattern::Minor => 2,
        }
    }
}

/// On/off control of the status LEDs
pub trait StatusLeds {
    fn set(&mut self, led: LedId, on: bool);

    /// Give the outputs back to their owner
    fn release(&mut self) {}
}

/// Buzzer / tone alarm output
pub trait ToneAlarm {
    /// Start playing a pattern, replacing the current one
    fn play(&mut self, pattern: AlarmPattern);

    /// Stop any pattern
    fn silence(&mut self);

    /// Give the output back to its owner
    fn release(&mut self) {}
}

/// An unfitted buzzer is silent
impl<T: ToneAlarm> ToneAlarm for Option<T> {
    fn play(&mut self, pattern: AlarmPattern) {
        if let Some(alarm) = self {
            alarm.play(pattern);
        }
    }

    fn silence(&mut self) {
        if let Some(alarm) = self {
            alarm.silence();
        }
    }

    fn release(&mut self) {
        if let Some(alarm) = self {
            alarm.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{AlarmEvent, MockAlarm};

    #[test]
    fn test_tune_ids() {
        assert_eq!(AlarmPattern::Major.tune_id(), 4);
        assert_eq!(AlarmPattern::Minor.tune_id(), 2);
    }

    #[test]
    fn test_optional_alarm() {
        let mut absent: Option<MockAlarm> = None;
        absent.play(AlarmPattern::Major);
        absent.silence();
        absent.release();

        let mut fitted = Some(MockAlarm::default());
        fitted.play(AlarmPattern::Minor);
        fitted.release();
        let alarm = fitted.unwrap();
        assert_eq!(alarm.events, [AlarmEvent::Play(AlarmPattern::Minor)]);
        assert_eq!(alarm.released, 1);
    }
}
