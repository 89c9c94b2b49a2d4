//! RC calibration validator
//!
//! Scans the whole channel bank and checks each channel's `min`, `trim`,
//! `max` and `deadzone` parameters against the configured limits. Unlike
//! the sensor sequencer nothing short-circuits: every broken invariant on
//! every channel is reported.

use core::fmt::{self, Write};

use embedded_hal::delay::DelayNs;
use heapless::Vec;

use crate::config::{ChannelLimits, MAX_CHANNELS};
use crate::error::InvariantViolation;
use crate::report::Reporter;
use crate::traits::{ParamName, ParamStore, StatusLog};

/// Calibration invariants, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Invariant {
    /// `min >= lower_bound`
    MinFloor,
    /// `max <= upper_bound`
    MaxCeiling,
    /// `trim >= min`
    TrimAboveMin,
    /// `trim <= max`
    TrimBelowMax,
    /// `deadzone <= deadzone_max`
    DeadzoneCeiling,
}

impl Invariant {
    pub const EVALUATION_ORDER: [Invariant; 5] = [
        Invariant::MinFloor,
        Invariant::MaxCeiling,
        Invariant::TrimAboveMin,
        Invariant::TrimBelowMax,
        Invariant::DeadzoneCeiling,
    ];

    /// Configured limit for range invariants (0 for trim ordering)
    pub fn bound(self, limits: &ChannelLimits) -> f32 {
        match self {
            Invariant::MinFloor => limits.lower_bound,
            Invariant::MaxCeiling => limits.upper_bound,
            Invariant::DeadzoneCeiling => limits.deadzone_max,
            Invariant::TrimAboveMin | Invariant::TrimBelowMax => 0.0,
        }
    }
}

/// Per-channel calibration parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelField {
    Min,
    Trim,
    Max,
    Reverse,
    Deadzone,
}

impl ChannelField {
    pub const fn suffix(self) -> &'static str {
        match self {
            ChannelField::Min => "MIN",
            ChannelField::Trim => "TRIM",
            ChannelField::Max => "MAX",
            ChannelField::Reverse => "REV",
            ChannelField::Deadzone => "DZ",
        }
    }

    /// Store name of this field for a channel, e.g. `RC3_TRIM`
    pub fn param_name(self, channel: u8) -> ParamName {
        let mut name = ParamName::new();
        // "RC255_TRIM" is the longest possible name and fits
        let _ = write!(name, "RC{}_{}", channel, self.suffix());
        name
    }
}

/// Calibration of one RC channel, as read from the parameter store
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelCalibration {
    pub min: f32,
    pub trim: f32,
    pub max: f32,
    /// Read for completeness; not subject to any invariant
    pub reverse: f32,
    pub deadzone: f32,
}

impl ChannelCalibration {
    /// Read a channel's parameters fresh from the store
    ///
    /// Missing parameters take whatever value the store reports for
    /// "not found"; they are then checked like any other value.
    pub fn read<P: ParamStore + ?Sized>(params: &P, channel: u8) -> Self {
        let field = |field: ChannelField| read_field(params, field.param_name(channel));
        Self {
            min: field(ChannelField::Min),
            trim: field(ChannelField::Trim),
            max: field(ChannelField::Max),
            reverse: field(ChannelField::Reverse),
            deadzone: field(ChannelField::Deadzone),
        }
    }

    /// Whether the invariant holds for this channel
    ///
    /// Plain float comparisons: calibration values are coarse pulse widths.
    pub fn holds(&self, invariant: Invariant, limits: &ChannelLimits) -> bool {
        let violated = match invariant {
            Invariant::MinFloor => self.min < limits.lower_bound,
            Invariant::MaxCeiling => self.max > limits.upper_bound,
            Invariant::TrimAboveMin => self.trim < self.min,
            Invariant::TrimBelowMax => self.trim > self.max,
            Invariant::DeadzoneCeiling => self.deadzone > limits.deadzone_max,
        };
        !violated
    }

    /// Evaluate all invariants in order
    pub fn evaluate(&self, channel: u8, limits: &ChannelLimits) -> ChannelVerdict {
        let mut verdict = ChannelVerdict::new(channel);
        for invariant in Invariant::EVALUATION_ORDER {
            if !self.holds(invariant, limits) {
                // Capacity equals the number of invariants
                let _ = verdict.violated.push(invariant);
            }
        }
        verdict
    }
}

fn read_field<P: ParamStore + ?Sized>(params: &P, name: ParamName) -> f32 {
    match params.get(&name) {
        Some(value) => value,
        None => {
            #[cfg(feature = "defmt")]
            defmt::warn!("parameter {} not found", name.as_str());
            params.not_found_value()
        }
    }
}

/// Violations found on one channel
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelVerdict {
    /// Channel number (1-based)
    pub channel: u8,
    /// Broken invariants in evaluation order
    pub violated: Vec<Invariant, 5>,
}

impl ChannelVerdict {
    pub fn new(channel: u8) -> Self {
        Self {
            channel,
            violated: Vec::new(),
        }
    }

    pub fn count(&self) -> usize {
        self.violated.len()
    }

    pub fn is_ok(&self) -> bool {
        self.violated.is_empty()
    }
}

/// Summary line for a failing channel
impl fmt::Display for ChannelVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ERROR: {} config error(s) for RC channel {}.",
            self.count(),
            self.channel
        )
    }
}

/// Result of a validator run
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RcReport {
    /// Channels scanned
    pub scanned: u8,
    /// Verdicts of the channels with at least one violation
    pub failing: Vec<ChannelVerdict, MAX_CHANNELS>,
}

impl RcReport {
    /// A single bad channel fails the whole RC check
    pub fn is_ok(&self) -> bool {
        self.failing.is_empty()
    }

    /// Total number of violations across all channels
    pub fn violation_count(&self) -> usize {
        self.failing.iter().map(ChannelVerdict::count).sum()
    }

    pub fn channel(&self, channel: u8) -> Option<&ChannelVerdict> {
        self.failing.iter().find(|v| v.channel == channel)
    }
}

/// Validate every channel of the bank
///
/// Emits one critical message per violation, then a summary per failing
/// channel. Channels 1..=`limits.count` are scanned regardless of how many
/// the vehicle actually uses.
pub fn validate_rc_channels<P, L, D>(
    params: &P,
    limits: &ChannelLimits,
    reporter: &mut Reporter<'_, L, D>,
) -> RcReport
where
    P: ParamStore + ?Sized,
    L: StatusLog + ?Sized,
    D: DelayNs + ?Sized,
{
    let mut report = RcReport {
        scanned: limits.scanned(),
        failing: Vec::new(),
    };

    for channel in 1..=report.scanned {
        let verdict = ChannelCalibration::read(params, channel).evaluate(channel, limits);
        if verdict.is_ok() {
            continue;
        }

        for &invariant in &verdict.violated {
            reporter.critical(InvariantViolation {
                channel,
                invariant,
                bound: invariant.bound(limits),
            });
        }
        reporter.critical(&verdict);

        // Capacity matches the largest scannable bank
        let _ = report.failing.push(verdict);
    }

    report
}
