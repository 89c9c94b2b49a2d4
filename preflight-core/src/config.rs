//! Gate configuration
//!
//! Every count, threshold and duration the gate uses lives here so it can be
//! injected at construction. Defaults reproduce the flight configuration;
//! tests shrink them.

/// Highest channel count the validator can scan (capacity of its reports)
pub const MAX_CHANNELS: usize = 18;

/// Channels scanned by default, independent of how many the vehicle uses
pub const DEFAULT_CHANNEL_COUNT: u8 = 12;

/// Lowest acceptable `RCn_MIN` in receiver-pulse units (µs)
pub const DEFAULT_LOWER_BOUND: f32 = 500.0;

/// Highest acceptable `RCn_MAX` in receiver-pulse units (µs)
pub const DEFAULT_UPPER_BOUND: f32 = 2500.0;

/// Highest acceptable `RCn_DZ` in receiver-pulse units (µs)
pub const DEFAULT_DEADZONE_MAX: f32 = 500.0;

/// Wait for background sensor sampling before the first check
pub const DEFAULT_SETTLE_MS: u32 = 150;

/// Gap after every critical message so the rate-limited link keeps up
pub const DEFAULT_MESSAGE_GAP_MS: u32 = 100;

/// Number of alert cycles on a failing verdict
pub const DEFAULT_ALERT_CYCLES: u16 = 150;

/// Length of one alert cycle
pub const DEFAULT_ALERT_CYCLE_MS: u32 = 100;

/// Cycle cadence of the major alarm pattern
pub const DEFAULT_MAJOR_EVERY: u16 = 10;

/// Cycle cadence of the minor alarm pattern
pub const DEFAULT_MINOR_EVERY: u16 = 5;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Channel count is zero or exceeds [`MAX_CHANNELS`]
    ChannelCount,
    /// Lower bound above upper bound, or a bound is not a number
    Bounds,
    /// Alarm cadence of zero cycles
    Cadence,
}

/// RC channel bank and its calibration limits
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelLimits {
    /// Channels scanned, numbered 1..=count
    pub count: u8,
    /// `min` floor
    pub lower_bound: f32,
    /// `max` ceiling
    pub upper_bound: f32,
    /// `deadzone` ceiling
    pub deadzone_max: f32,
}

impl Default for ChannelLimits {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelLimits {
    pub const fn new() -> Self {
        Self {
            count: DEFAULT_CHANNEL_COUNT,
            lower_bound: DEFAULT_LOWER_BOUND,
            upper_bound: DEFAULT_UPPER_BOUND,
            deadzone_max: DEFAULT_DEADZONE_MAX,
        }
    }

    /// Channels actually scanned, clamped to report capacity
    pub fn scanned(&self) -> u8 {
        self.count.min(MAX_CHANNELS as u8)
    }
}

/// Blocking waits used by the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timing {
    /// Initial wait before checks begin (ms)
    pub settle_ms: u32,
    /// Wait after every critical message (ms)
    pub message_gap_ms: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self::new()
    }
}

impl Timing {
    pub const fn new() -> Self {
        Self {
            settle_ms: DEFAULT_SETTLE_MS,
            message_gap_ms: DEFAULT_MESSAGE_GAP_MS,
        }
    }
}

/// Failure alert loop parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlertConfig {
    /// Number of toggle cycles
    pub cycles: u16,
    /// Duration of one cycle (ms)
    pub cycle_ms: u32,
    /// Major pattern on every n-th cycle (starting at cycle 0)
    pub major_every: u16,
    /// Minor pattern on every n-th cycle not already major
    pub minor_every: u16,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertConfig {
    pub const fn new() -> Self {
        Self {
            cycles: DEFAULT_ALERT_CYCLES,
            cycle_ms: DEFAULT_ALERT_CYCLE_MS,
            major_every: DEFAULT_MAJOR_EVERY,
            minor_every: DEFAULT_MINOR_EVERY,
        }
    }

    /// Total alert duration in milliseconds
    pub fn duration_ms(&self) -> u32 {
        self.cycles as u32 * self.cycle_ms
    }
}

/// Complete gate configuration
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PreflightConfig {
    pub channels: ChannelLimits,
    pub timing: Timing,
    pub alert: AlertConfig,
}

impl PreflightConfig {
    /// Flight defaults
    pub const fn new() -> Self {
        Self {
            channels: ChannelLimits::new(),
            timing: Timing::new(),
            alert: AlertConfig::new(),
        }
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ch = &self.channels;
        if ch.count == 0 || ch.count as usize > MAX_CHANNELS {
            return Err(ConfigError::ChannelCount);
        }
        // Written negated so NaN bounds are rejected too
        if !(ch.lower_bound <= ch.upper_bound) || ch.deadzone_max.is_nan() {
            return Err(ConfigError::Bounds);
        }
        if self.alert.major_every == 0 || self.alert.minor_every == 0 {
            return Err(ConfigError::Cadence);
        }
        Ok(())
    }
}
