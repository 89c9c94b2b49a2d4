//! Hardware abstraction traits
//!
//! These traits define the interface between the gate logic and the
//! collaborators it only consumes: sensor drivers, the parameter store,
//! the operator log channel and the indicator outputs. Blocking waits use
//! [`embedded_hal::delay::DelayNs`].

pub mod indicator;
pub mod log;
pub mod params;
pub mod sensor;

pub use indicator::{AlarmPattern, LedId, StatusLeds, ToneAlarm};
pub use log::StatusLog;
pub use params::{ParamName, ParamStore, MAX_PARAM_NAME_LEN};
pub use sensor::{FailureReason, SelfTest, SensorKind, SensorSuite};
