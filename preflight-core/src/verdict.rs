//! Overall health verdict and exit policy

/// Aggregated result of the checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SystemVerdict {
    pub sensor_ok: bool,
    /// True as well when the RC check was skipped
    pub rc_ok: bool,
}

impl SystemVerdict {
    pub const HEALTHY: Self = Self {
        sensor_ok: true,
        rc_ok: true,
    };

    pub const FAILED: Self = Self {
        sensor_ok: false,
        rc_ok: false,
    };

    pub fn ok(&self) -> bool {
        self.sensor_ok && self.rc_ok
    }
}

/// What a failing verdict means for the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FailurePolicy {
    /// Alert the operator but report success
    #[default]
    Tolerate,
    /// Alert the operator and report failure (`--fail-on-error`)
    Strict,
}

/// Process exit status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ExitStatus {
    Success = 0,
    Failure = 1,
}

impl ExitStatus {
    pub const fn code(self) -> i32 {
        self as i32
    }

    pub fn is_success(self) -> bool {
        self == ExitStatus::Success
    }
}

impl FailurePolicy {
    /// Exit status for a completed run with the given verdict
    pub fn exit_status(self, verdict: &SystemVerdict) -> ExitStatus {
        match (verdict.ok(), self) {
            (false, FailurePolicy::Strict) => ExitStatus::Failure,
            _ => ExitStatus::Success,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_requires_both() {
        assert!(SystemVerdict::HEALTHY.ok());
        assert!(!SystemVerdict { sensor_ok: false, rc_ok: true }.ok());
        assert!(!SystemVerdict { sensor_ok: true, rc_ok: false }.ok());
    }

    #[test]
    fn test_exit_status_by_policy() {
        let bad = SystemVerdict { sensor_ok: true, rc_ok: false };

        assert_eq!(FailurePolicy::Tolerate.exit_status(&bad), ExitStatus::Success);
        assert_eq!(FailurePolicy::Strict.exit_status(&bad), ExitStatus::Failure);
        assert_eq!(
            FailurePolicy::Strict.exit_status(&SystemVerdict::HEALTHY),
            ExitStatus::Success
        );
        assert_eq!(ExitStatus::Failure.code(), 1);
        assert_eq!(ExitStatus::Success.code(), 0);
    }
}
