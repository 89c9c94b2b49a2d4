//! Recording test doubles for the hardware traits

use std::collections::HashMap;
use std::string::{String, ToString};
use std::vec::Vec;

use embedded_hal::delay::DelayNs;

use crate::calibration::ChannelField;
use crate::traits::{
    AlarmPattern, FailureReason, LedId, ParamStore, SensorKind, SensorSuite, StatusLeds,
    StatusLog, ToneAlarm,
};

#[derive(Debug, Default)]
pub struct RecordingLog {
    pub critical: Vec<String>,
    pub console: Vec<String>,
    pub flushes: usize,
}

impl StatusLog for RecordingLog {
    fn critical(&mut self, message: &str) {
        self.critical.push(message.to_string());
    }

    fn console(&mut self, message: &str) {
        self.console.push(message.to_string());
    }

    fn flush(&mut self) {
        self.flushes += 1;
    }
}

/// Records requested waits in milliseconds instead of sleeping
#[derive(Debug, Default)]
pub struct RecordingDelay {
    pub calls: Vec<u32>,
}

impl RecordingDelay {
    pub fn total_ms(&self) -> u64 {
        self.calls.iter().map(|&ms| ms as u64).sum()
    }
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.calls.push(ns / 1_000_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.calls.push(ms);
    }
}

/// Sensor suite with scripted failures
#[derive(Debug, Default)]
pub struct MockSuite {
    open_fails: Vec<SensorKind>,
    test_fails: Vec<(SensorKind, FailureReason)>,
    pub opened: Vec<SensorKind>,
    pub tested: Vec<SensorKind>,
    pub released: Vec<SensorKind>,
}

impl MockSuite {
    pub fn healthy() -> Self {
        Self::default()
    }

    pub fn fail_open(&mut self, kind: SensorKind) {
        self.open_fails.push(kind);
    }

    pub fn fail_test(&mut self, kind: SensorKind, reason: FailureReason) {
        self.test_fails.push((kind, reason));
    }
}

impl SensorSuite for MockSuite {
    fn open(&mut self, kind: SensorKind) -> Result<(), FailureReason> {
        self.opened.push(kind);
        if self.open_fails.contains(&kind) {
            Err(FailureReason::NoDevice)
        } else {
            Ok(())
        }
    }

    fn self_test(&mut self, kind: SensorKind) -> Result<(), FailureReason> {
        self.tested.push(kind);
        match self.test_fails.iter().find(|(k, _)| *k == kind) {
            Some(&(_, reason)) => Err(reason),
            None => Ok(()),
        }
    }

    fn release(&mut self, kind: SensorKind) {
        self.released.push(kind);
    }
}

/// Parameter store backed by a hash map
#[derive(Debug, Default)]
pub struct MapParams {
    values: HashMap<String, f32>,
    pub not_found: f32,
}

impl MapParams {
    /// Channels 1..=count calibrated to 1000/1500/2000, deadzone 10
    pub fn nominal(count: u8) -> Self {
        let mut params = Self::default();
        for ch in 1..=count {
            params.set(&ChannelField::Min.param_name(ch), 1000.0);
            params.set(&ChannelField::Trim.param_name(ch), 1500.0);
            params.set(&ChannelField::Max.param_name(ch), 2000.0);
            params.set(&ChannelField::Reverse.param_name(ch), 1.0);
            params.set(&ChannelField::Deadzone.param_name(ch), 10.0);
        }
        params
    }

    pub fn set(&mut self, name: &str, value: f32) {
        self.values.insert(name.to_string(), value);
    }

    pub fn remove(&mut self, name: &str) {
        self.values.remove(name);
    }
}

impl ParamStore for MapParams {
    fn get(&self, name: &str) -> Option<f32> {
        self.values.get(name).copied()
    }

    fn not_found_value(&self) -> f32 {
        self.not_found
    }
}

#[derive(Debug, Default)]
pub struct MockLeds {
    pub state: [bool; 2],
    pub history: Vec<(LedId, bool)>,
    pub released: usize,
}

impl MockLeds {
    pub fn is_on(&self, led: LedId) -> bool {
        self.state[led.index()]
    }

    /// Number of on/off transitions seen on one LED
    pub fn toggles(&self, led: LedId) -> usize {
        let mut last = false;
        let mut count = 0;
        for &(id, on) in &self.history {
            if id == led {
                if on != last {
                    count += 1;
                }
                last = on;
            }
        }
        count
    }
}

impl StatusLeds for MockLeds {
    fn set(&mut self, led: LedId, on: bool) {
        self.state[led.index()] = on;
        self.history.push((led, on));
    }

    fn release(&mut self) {
        self.released += 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmEvent {
    Play(AlarmPattern),
    Silence,
}

#[derive(Debug, Default)]
pub struct MockAlarm {
    pub events: Vec<AlarmEvent>,
    pub released: usize,
}

impl MockAlarm {
    pub fn plays(&self, pattern: AlarmPattern) -> usize {
        self.events
            .iter()
            .filter(|e| **e == AlarmEvent::Play(pattern))
            .count()
    }
}

impl ToneAlarm for MockAlarm {
    fn play(&mut self, pattern: AlarmPattern) {
        self.events.push(AlarmEvent::Play(pattern));
    }

    fn silence(&mut self) {
        self.events.push(AlarmEvent::Silence);
    }

    fn release(&mut self) {
        self.released += 1;
    }
}
