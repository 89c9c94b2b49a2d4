//! Operator log channels

/// Message sinks towards the operator
///
/// `critical` feeds the rate-limited link to the ground station; the
/// transport is assumed to drop messages that arrive faster than it can
/// forward them, so the gate paces its writes. `console` is the local
/// diagnostic output and is not paced.
pub trait StatusLog {
    /// Emit one critical message
    fn critical(&mut self, message: &str);

    /// Emit one line of console output
    fn console(&mut self, message: &str);

    /// Push out anything still buffered
    fn flush(&mut self) {}
}
