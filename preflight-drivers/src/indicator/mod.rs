//! Status indicator outputs

pub mod buzzer;
pub mod led;

pub use buzzer::PwmBuzzer;
pub use led::GpioLeds;
