//! Failure alert
//!
//! Turns the verdict into an exit status. A failing verdict first plays a
//! bounded LED and buzzer sequence so the operator notices it even without
//! a ground station attached.

pub mod controller;
pub mod state;

pub use controller::{AlertController, LedPhases};
pub use state::{AlertEvent, AlertState};
