//! Operator log over defmt

use preflight_core::traits::StatusLog;

/// Sends critical messages at error level and console output at info level
///
/// The RTT link stands in for the ground-station link, so critical
/// messages are still paced by the gate.
pub struct DefmtLog;

impl StatusLog for DefmtLog {
    fn critical(&mut self, message: &str) {
        defmt::error!("{=str}", message);
    }

    fn console(&mut self, message: &str) {
        defmt::info!("{=str}", message);
    }

    fn flush(&mut self) {
        defmt::flush();
    }
}
