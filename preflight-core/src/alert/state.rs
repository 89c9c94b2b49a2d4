//! Alert state machine

use crate::config::AlertConfig;
use crate::verdict::{ExitStatus, FailurePolicy, SystemVerdict};

/// Alert states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlertState {
    /// Waiting for the verdict
    Idle,
    /// Playing the alert; `cycle` is the index of the next cycle
    Alerting { cycle: u16 },
    /// Done, with the status to exit with
    Terminated(ExitStatus),
}

/// Events driving the alert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlertEvent {
    /// Checks finished with this verdict
    Verdict(SystemVerdict),
    /// One alert cycle has been played
    CycleElapsed,
}

impl AlertState {
    pub fn is_terminated(&self) -> bool {
        matches!(self, AlertState::Terminated(_))
    }

    /// Process an event and return the next state
    ///
    /// A configuration with zero cycles never enters `Alerting`.
    pub fn transition(self, event: AlertEvent, config: &AlertConfig, policy: FailurePolicy) -> Self {
        use AlertEvent::*;
        use AlertState::*;

        match (self, event) {
            (Idle, Verdict(verdict)) if verdict.ok() => Terminated(ExitStatus::Success),
            (Idle, Verdict(verdict)) if config.cycles == 0 => Terminated(policy.exit_status(&verdict)),
            (Idle, Verdict(_)) => Alerting { cycle: 0 },

            (Alerting { cycle }, CycleElapsed) => {
                let next = cycle.saturating_add(1);
                if next >= config.cycles {
                    // Only failing verdicts reach Alerting
                    Terminated(policy.exit_status(&SystemVerdict::FAILED))
                } else {
                    Alerting { cycle: next }
                }
            }

            // Terminated is final; anything unexpected is ignored
            _ => self,
        }
    }
}
